//! Field normalization applied between the OCR results and the final CSV.
//!
//! The [`Normalizer`] trait is the seam for an external text-cleanup service
//! (for example a language model that fixes dates and account numbers). The
//! only implementation shipped here trims whitespace.
use anyhow::Result;
use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::batch::FieldResult;

/// Maps one image's OCR fields to final column values.
pub trait Normalizer {
    fn normalize(&self, fields: &IndexMap<String, FieldResult>) -> Result<BTreeMap<String, String>>;
}

/// Passes each field's text through unchanged apart from trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimNormalizer;

impl Normalizer for TrimNormalizer {
    fn normalize(&self, fields: &IndexMap<String, FieldResult>) -> Result<BTreeMap<String, String>> {
        Ok(fields
            .iter()
            .map(|(name, field)| (name.clone(), field.ocr_text.trim().to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_normalizer() {
        let mut fields = IndexMap::new();
        fields.insert(
            "names".to_string(),
            FieldResult {
                ocr_text: "  Jane Doe ".into(),
                crop_path: None,
            },
        );
        fields.insert("email".to_string(), FieldResult::failed());

        let normalized = TrimNormalizer.normalize(&fields).unwrap();
        assert_eq!(normalized["names"], "Jane Doe");
        assert_eq!(normalized["email"], "");
        assert_eq!(normalized.len(), 2);
    }
}
