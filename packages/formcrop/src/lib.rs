//! # formcrop
//!
//! Pulls field values out of scanned forms. A blueprint describes where each
//! field sits on the page in percentage coordinates; every input image is cut
//! into one crop per field, each crop is run through a text recognizer, and
//! the results are collected into JSON and later flattened into CSV.
//!
//! ## Stages
//!
//! - **Geometry**: percentage boxes to clamped pixel rectangles
//! - **Cropping**: one named sub-image per blueprint entry
//! - **Batch OCR**: crop, save and recognize every image, isolating failures
//!   per image and per field
//! - **Export**: JSON results, the final CSV, and a column rename/reorder pass
//!
//! ## Quick Start
//!
//! ```ignore
//! use formcrop::prelude::*;
//! use formcrop_ocr::{negotiate, BackendConfig};
//!
//! let mut recognizer = negotiate(&BackendConfig::default())?;
//! let report = run_batch(&["scans/"], Path::new("blueprint.json"), recognizer.as_mut(), BatchOptions::default())?;
//! write_batch_json(&report.results, Path::new("ocr_results.json"))?;
//! export_csv(Path::new("ocr_results.json"), Path::new("final.csv"), &TrimNormalizer)?;
//! ```

pub mod batch;
pub mod blueprint;
pub mod crop;
pub mod export;
pub mod geometry;
pub mod normalize;
pub mod schema;

// Re-export commonly used types at the root level
pub use batch::{
    expand_inputs, run_batch, BatchOptions, BatchProcessor, BatchReport, BatchResult, BatchStats, FieldResult,
    ImageResult,
};
pub use blueprint::{load_blueprint, Blueprint, BlueprintEntry, BlueprintError};
pub use crop::{extract_crops, resolve_field_name, NameResolution};
pub use export::{
    build_rows, export_csv, header_for, read_batch_json, write_batch_json, write_rows_csv, CsvExportSummary,
    FinalRow, SOURCE_FILE_COLUMN,
};
pub use geometry::{to_pixel_rect, PixelRect};
pub use normalize::{Normalizer, TrimNormalizer};
pub use schema::{fix_columns, rename_and_reorder, ColumnSchema, SchemaError, Table};

/// Prelude module for convenient imports
///
/// ```ignore
/// use formcrop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        build_rows, expand_inputs, export_csv, extract_crops, fix_columns, load_blueprint, read_batch_json,
        rename_and_reorder, run_batch, to_pixel_rect, write_batch_json, BatchOptions, BatchProcessor, BatchReport,
        BatchResult, Blueprint, BlueprintEntry, ColumnSchema, FieldResult, ImageResult, NameResolution, Normalizer,
        PixelRect, TrimNormalizer,
    };
}
