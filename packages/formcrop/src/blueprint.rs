//! Loading of bounding-box templates ("blueprints").
//!
//! A blueprint file is a JSON array of annotation records, each holding a
//! `bbox` list of percentage boxes:
//!
//! ```json
//! [{ "bbox": [{ "x": 10.0, "y": 4.5, "width": 30.0, "height": 5.0, "name": "acc_no" }] }]
//! ```
//!
//! Only the first record's boxes are used; the same template is applied to
//! every image in a run.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// One named field location, in percent of the source image's size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BlueprintEntry {
    /// Unnamed box; mostly useful in tests and previews.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            name: None,
            field: None,
            labels: Vec::new(),
            x,
            y,
            width,
            height,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct BlueprintRecord {
    bbox: Vec<BlueprintEntry>,
}

/// The active template for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blueprint {
    pub entries: Vec<BlueprintEntry>,
}

#[derive(Debug, Error)]
pub enum BlueprintError {
    #[error("failed to read blueprint {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed blueprint: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("blueprint contains no records")]
    NoRecords,
}

impl Blueprint {
    pub fn new(entries: Vec<BlueprintEntry>) -> Self {
        Self { entries }
    }

    /// Parses blueprint JSON, keeping the first record's boxes.
    pub fn from_json_str(json: &str) -> Result<Self, BlueprintError> {
        let records: Vec<BlueprintRecord> = serde_json::from_str(json)?;
        let total = records.len();
        let first = records.into_iter().next().ok_or(BlueprintError::NoRecords)?;

        if total > 1 {
            debug!(ignored = total - 1, "only the first blueprint record is used");
        }

        Ok(Self { entries: first.bbox })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads and parses the blueprint file at `path`.
pub fn load_blueprint(path: &Path) -> Result<Blueprint, BlueprintError> {
    let json = std::fs::read_to_string(path).map_err(|source| BlueprintError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Blueprint::from_json_str(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_first_record_only() {
        let json = r#"[
            {"bbox": [{"x": 1, "y": 2, "width": 3, "height": 4, "name": "branch"}]},
            {"bbox": [{"x": 50, "y": 50, "width": 5, "height": 5, "name": "other"}]}
        ]"#;
        let blueprint = Blueprint::from_json_str(json).unwrap();
        assert_eq!(blueprint.len(), 1);
        assert_eq!(blueprint.entries[0].name.as_deref(), Some("branch"));
        assert_eq!(blueprint.entries[0].width, 3.0);
    }

    #[test]
    fn test_optional_keys_and_extras() {
        let json = r#"[{"id": 7, "bbox": [
            {"x": 10.5, "y": 0, "width": 20, "height": 5, "labels": ["email", "contact"], "rotation": 0},
            {"x": 0, "y": 0, "width": 1, "height": 1, "field": "DOA"}
        ]}]"#;
        let blueprint = Blueprint::from_json_str(json).unwrap();
        assert_eq!(blueprint.entries[0].labels, vec!["email", "contact"]);
        assert!(blueprint.entries[0].name.is_none());
        assert_eq!(blueprint.entries[1].field.as_deref(), Some("DOA"));
    }

    #[test]
    fn test_empty_array_is_an_error() {
        assert!(matches!(
            Blueprint::from_json_str("[]"),
            Err(BlueprintError::NoRecords)
        ));
    }

    #[test]
    fn test_record_without_bbox_is_malformed() {
        assert!(matches!(
            Blueprint::from_json_str(r#"[{"boxes": []}]"#),
            Err(BlueprintError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_blueprint(Path::new("no/such/blueprint.json")).unwrap_err();
        assert!(matches!(err, BlueprintError::Io { .. }));
        assert!(err.to_string().contains("no/such/blueprint.json"));
    }
}
