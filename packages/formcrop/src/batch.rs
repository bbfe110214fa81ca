//! The crop/OCR stage: expands input paths, crops every image with the
//! blueprint, saves each crop and runs the recognizer on it.
//!
//! Failures are isolated per image (undecodable files are skipped) and per
//! field (a failed save or recognition yields an empty [`FieldResult`]).
use anyhow::{Context, Result};
use formcrop_ocr::{denoise, Recognizer};
use image::{DynamicImage, ImageReader};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::blueprint::{load_blueprint, Blueprint};
use crate::crop::{extract_crops, NameResolution};

/// Extensions picked up when an input path is a directory (compared
/// case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];

/// OCR outcome for one field of one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResult {
    #[serde(default)]
    pub ocr_text: String,
    #[serde(default)]
    pub crop_path: Option<String>,
}

impl FieldResult {
    /// The record written when saving or recognizing a field failed.
    pub fn failed() -> Self {
        Self::default()
    }
}

/// All fields extracted from one source image, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    #[serde(rename = "_source_file", default)]
    pub source_file: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldResult>,
}

/// Results of a whole run, in processing order.
pub type BatchResult = Vec<ImageResult>;

/// Counters reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub images_processed: usize,
    pub images_skipped: usize,
    pub fields_recognized: usize,
    pub fields_failed: usize,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: BatchResult,
    pub stats: BatchStats,
}

/// Options for the crop/OCR stage.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Crops are written to `<save_root>/<image_stem>/<field>.png`.
    pub save_root: PathBuf,
    pub name_resolution: NameResolution,
    /// Run [`formcrop_ocr::denoise`] on each crop before recognition.
    pub denoise: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            save_root: PathBuf::from("saved_crops"),
            name_resolution: NameResolution::Template,
            denoise: false,
        }
    }
}

/// A single crop on its way to disk and the recognizer.
struct CropRecord {
    field_name: String,
    image: DynamicImage,
    save_path: PathBuf,
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Expands the input arguments into the list of files to process.
///
/// Directories contribute their direct image children, sorted by path. Any
/// other path is kept as given, in argument order.
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if !input.is_dir() {
            files.push(input.to_path_buf());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
            let entry = entry.with_context(|| format!("Failed to list {}", input.display()))?;
            // `Path::is_file` follows symlinks; a dangling link is not a file.
            if entry.path().is_file() && has_image_extension(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }

    Ok(files)
}

/// Decodes an image by sniffing its contents, so misnamed or extensionless
/// files still load. The extension is only a fallback.
fn decode_image(path: &Path) -> Result<DynamicImage> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image)
}

fn replace_newlines(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

/// Drives the crop/OCR stage for one blueprint and one recognizer.
pub struct BatchProcessor<'r> {
    blueprint: Blueprint,
    recognizer: &'r mut dyn Recognizer,
    options: BatchOptions,
    stats: BatchStats,
}

impl<'r> BatchProcessor<'r> {
    pub fn new(blueprint: Blueprint, recognizer: &'r mut dyn Recognizer, options: BatchOptions) -> Self {
        Self {
            blueprint,
            recognizer,
            options,
            stats: BatchStats::default(),
        }
    }

    /// Processes every image named by `inputs`.
    pub fn process_inputs<P: AsRef<Path>>(mut self, inputs: &[P]) -> Result<BatchReport> {
        let files = expand_inputs(inputs)?;
        info!(
            images = files.len(),
            fields = self.blueprint.len(),
            backend = %self.recognizer.kind(),
            "Starting crop/OCR batch"
        );

        let mut results = Vec::with_capacity(files.len());
        for file in &files {
            if let Some(result) = self.process_image(file) {
                results.push(result);
            }
        }

        Ok(BatchReport {
            results,
            stats: self.stats,
        })
    }

    /// Decodes, crops and recognizes one image. Returns `None` when the file
    /// cannot be decoded.
    pub fn process_image(&mut self, path: &Path) -> Option<ImageResult> {
        info!("Processing: {}", path.display());

        let image = match decode_image(path) {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to read {}: {:#}", path.display(), e);
                self.stats.images_skipped += 1;
                return None;
            }
        };

        let crops = extract_crops(&image, &self.blueprint.entries, self.options.name_resolution);
        let fields = self.ocr_crops(crops, path);
        self.stats.images_processed += 1;

        Some(ImageResult {
            source_file: path.to_string_lossy().into_owned(),
            fields,
        })
    }

    fn ocr_crops(
        &mut self,
        crops: IndexMap<String, DynamicImage>,
        image_path: &Path,
    ) -> IndexMap<String, FieldResult> {
        let image_stem = image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let crop_dir = self.options.save_root.join(image_stem);

        let mut results = IndexMap::new();
        for (field_name, image) in crops {
            let record = CropRecord {
                save_path: crop_dir.join(format!("{field_name}.png")),
                field_name,
                image,
            };

            let result = match self.ocr_field(&record) {
                Ok(result) => {
                    self.stats.fields_recognized += 1;
                    result
                }
                Err(e) => {
                    warn!("OCR failed for {}: {:#}", record.field_name, e);
                    self.stats.fields_failed += 1;
                    FieldResult::failed()
                }
            };
            results.insert(record.field_name, result);
        }

        results
    }

    fn ocr_field(&mut self, record: &CropRecord) -> Result<FieldResult> {
        if let Some(parent) = record.save_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        record
            .image
            .save(&record.save_path)
            .with_context(|| format!("Failed to save crop {}", record.save_path.display()))?;

        let text = if self.options.denoise {
            self.recognizer.recognize(&denoise(&record.image))?
        } else {
            self.recognizer.recognize(&record.image)?
        };

        Ok(FieldResult {
            ocr_text: replace_newlines(&text),
            crop_path: Some(record.save_path.to_string_lossy().into_owned()),
        })
    }
}

/// Loads the blueprint once and runs the crop/OCR stage over `inputs`.
pub fn run_batch<P: AsRef<Path>>(
    inputs: &[P],
    blueprint_path: &Path,
    recognizer: &mut dyn Recognizer,
    options: BatchOptions,
) -> Result<BatchReport> {
    let blueprint = load_blueprint(blueprint_path)
        .with_context(|| format!("Failed to load blueprint {}", blueprint_path.display()))?;
    BatchProcessor::new(blueprint, recognizer, options).process_inputs(inputs)
}
