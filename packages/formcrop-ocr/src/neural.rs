use image::DynamicImage;
use oar_ocr::oarocr::ocr::{OAROCRBuilder, OAROCR};
use tracing::trace;

use crate::engine::{BackendKind, NeuralModelPaths, OcrError, Recognizer};
use crate::region::{best_region, TextRegion};

/// Detection + recognition pipeline built once from ONNX model files.
pub struct NeuralRecognizer {
    pipeline: OAROCR,
}

impl NeuralRecognizer {
    pub fn new(paths: &NeuralModelPaths) -> Result<Self, OcrError> {
        for path in [&paths.detection_model, &paths.recognition_model, &paths.char_dict] {
            if !path.exists() {
                return Err(OcrError::InvalidInput(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let pipeline = OAROCRBuilder::new(
            paths.detection_model.clone(),
            paths.recognition_model.clone(),
            paths.char_dict.clone(),
        )
        .build()
        .map_err(|e| OcrError::EngineError(format!("failed to build OCR pipeline: {e}")))?;

        Ok(Self { pipeline })
    }
}

impl Recognizer for NeuralRecognizer {
    fn kind(&self) -> BackendKind {
        BackendKind::Neural
    }

    fn recognize(&mut self, crop: &DynamicImage) -> Result<String, OcrError> {
        // The pipeline expects 3-channel input regardless of the crop's color type.
        let rgb = crop.to_rgb8();
        let results = self
            .pipeline
            .predict(vec![rgb])
            .map_err(|e| OcrError::EngineError(e.to_string()))?;

        let regions: Vec<TextRegion> = results
            .into_iter()
            .flat_map(|result| result.text_regions)
            .filter_map(|region| {
                let text = region.text?;
                Some(TextRegion::new(text.to_string(), region.confidence))
            })
            .collect();

        trace!(candidates = regions.len(), "neural recognition finished");

        Ok(best_region(&regions)
            .map(|region| region.text.trim().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_model_files_rejected() {
        let paths = NeuralModelPaths {
            detection_model: PathBuf::from("does/not/exist/det.onnx"),
            recognition_model: PathBuf::from("does/not/exist/rec.onnx"),
            char_dict: PathBuf::from("does/not/exist/dict.txt"),
        };
        match NeuralRecognizer::new(&paths) {
            Err(OcrError::InvalidInput(msg)) => assert!(msg.contains("det.onnx")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("construction should fail without model files"),
        }
    }
}
