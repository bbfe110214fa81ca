//! JSON persistence of batch results and the flattening of those results
//! into the final CSV.
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::batch::ImageResult;
use crate::normalize::Normalizer;

/// Column holding the source image path in the final CSV.
pub const SOURCE_FILE_COLUMN: &str = "_source_file";

/// One CSV row: column name to cell value.
pub type FinalRow = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExportSummary {
    pub rows: usize,
    pub columns: usize,
}

/// Writes the batch results as pretty-printed JSON, replacing any existing
/// file.
pub fn write_batch_json(results: &[ImageResult], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write OCR results to {}", path.display()))?;
    Ok(())
}

/// Loads batch results previously written by [`write_batch_json`].
pub fn read_batch_json(path: &Path) -> Result<Vec<ImageResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read OCR results from {}", path.display()))?;
    let results = serde_json::from_str(&content)
        .with_context(|| format!("Malformed OCR results in {}", path.display()))?;
    Ok(results)
}

/// Normalizes each image's fields and tags the row with its source file.
pub fn build_rows(results: &[ImageResult], normalizer: &dyn Normalizer) -> Result<Vec<FinalRow>> {
    results
        .iter()
        .map(|item| {
            let mut row = normalizer
                .normalize(&item.fields)
                .with_context(|| format!("Normalization failed for {}", item.source_file))?;
            row.insert(SOURCE_FILE_COLUMN.to_string(), item.source_file.clone());
            Ok(row)
        })
        .collect()
}

/// Sorted union of every column that appears in any row.
pub fn header_for(rows: &[FinalRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| row.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Writes `rows` as CSV. Cells for columns a row lacks are left empty.
pub fn write_rows_csv<W: Write>(rows: &[FinalRow], writer: W) -> Result<()> {
    let header = header_for(rows);
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&header)?;
    for row in rows {
        wtr.write_record(header.iter().map(|column| row.get(column).map(String::as_str).unwrap_or("")))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads an OCR results file and writes the final CSV.
pub fn export_csv(input_json: &Path, output_csv: &Path, normalizer: &dyn Normalizer) -> Result<CsvExportSummary> {
    let results = read_batch_json(input_json)?;
    let rows = build_rows(&results, normalizer)?;
    let columns = header_for(&rows).len();

    let file = File::create(output_csv)
        .with_context(|| format!("Failed to create {}", output_csv.display()))?;
    write_rows_csv(&rows, file)?;

    info!("Final CSV saved to {}", output_csv.display());

    Ok(CsvExportSummary {
        rows: rows.len(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FieldResult;
    use crate::normalize::TrimNormalizer;

    fn image_result(source: &str, fields: &[(&str, &str)]) -> ImageResult {
        ImageResult {
            source_file: source.to_string(),
            fields: fields
                .iter()
                .map(|(name, text)| {
                    (
                        name.to_string(),
                        FieldResult {
                            ocr_text: text.to_string(),
                            crop_path: None,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_header_is_sorted_union() {
        let results = vec![
            image_result("a.png", &[("names", "Jane"), ("branch", "Nairobi")]),
            image_result("b.png", &[("email", "j@x.io")]),
        ];
        let rows = build_rows(&results, &TrimNormalizer).unwrap();
        assert_eq!(
            header_for(&rows),
            vec!["_source_file", "branch", "email", "names"]
        );
    }

    #[test]
    fn test_missing_cells_are_empty() {
        let results = vec![
            image_result("a.png", &[("names", " Jane ")]),
            image_result("b.png", &[("email", "j@x.io")]),
        ];
        let rows = build_rows(&results, &TrimNormalizer).unwrap();

        let mut out = Vec::new();
        write_rows_csv(&rows, &mut out).unwrap();
        let csv_text = String::from_utf8(out).unwrap();
        assert_eq!(
            csv_text,
            "_source_file,email,names\na.png,,Jane\nb.png,j@x.io,\n"
        );
    }

    #[test]
    fn test_tolerates_missing_keys() {
        let results: Vec<ImageResult> =
            serde_json::from_str(r#"[{"fields": {"acc_no": {}}}, {"_source_file": "x.png"}]"#).unwrap();
        assert_eq!(results[0].source_file, "");
        assert_eq!(results[0].fields["acc_no"], FieldResult::failed());
        assert!(results[1].fields.is_empty());
    }
}
