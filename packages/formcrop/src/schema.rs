//! Renames placeholder `field_<n>` columns to real field names and puts the
//! CSV into a fixed column order.
//!
//! Blueprints exported without names produce columns `field_0`, `field_1`, ...
//! A [`ColumnSchema`] lists the real names in template order; the n-th
//! placeholder (by numeric index) receives the n-th name.
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::export::SOURCE_FILE_COLUMN;

/// Placeholder columns written for unnamed blueprint boxes.
static PLACEHOLDER_COLUMN: OnceLock<Regex> = OnceLock::new();

fn placeholder_pattern() -> &'static Regex {
    PLACEHOLDER_COLUMN.get_or_init(|| Regex::new(r"^field_(\d+)$").unwrap())
}

/// Column layout of the loan application form the tool was first built for.
const LOAN_APPLICATION_COLUMNS: &[&str] = &[
    "branch",
    "DOA",
    "acc_no",
    "names",
    "nationality",
    "p_code",
    "mobile_no",
    "email",
    "p_address",
    "net_salary",
    "id_no",
    "NOD",
];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected column '{0}' is missing from the CSV")]
    MissingColumn(String),
    #[error("column schema is empty")]
    EmptySchema,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed column schema: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Ordered list of final column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    Bare(Vec<String>),
    Wrapped { columns: Vec<String> },
}

impl ColumnSchema {
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::EmptySchema);
        }
        Ok(Self { columns })
    }

    pub fn loan_application() -> Self {
        Self {
            columns: LOAN_APPLICATION_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Accepts either `["a", "b"]` or `{"columns": ["a", "b"]}`.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let columns = match serde_json::from_str::<SchemaFile>(json)? {
            SchemaFile::Bare(columns) => columns,
            SchemaFile::Wrapped { columns } => columns,
        };
        Self::new(columns)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::loan_application()
    }
}

/// Numeric index of a placeholder column such as `field_7`.
pub fn placeholder_index(column: &str) -> Option<u64> {
    placeholder_pattern()
        .captures(column)
        .and_then(|caps| caps[1].parse().ok())
}

/// A CSV table held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Renames placeholder columns positionally and projects the table onto the
/// schema's column order. Columns outside the schema are dropped, the
/// source-file column included.
pub fn rename_and_reorder(table: &Table, schema: &ColumnSchema) -> Result<Table, SchemaError> {
    let mut placeholders: Vec<(u64, usize)> = table
        .headers
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| placeholder_index(name).map(|n| (n, idx)))
        .collect();
    placeholders.sort();

    let mut headers: Vec<String> = table.headers.clone();
    for ((_, idx), new_name) in placeholders.iter().zip(schema.columns()) {
        debug!(from = %table.headers[*idx], to = %new_name, "renaming column");
        headers[*idx] = new_name.clone();
    }

    let positions = schema
        .columns()
        .iter()
        .map(|column| {
            headers
                .iter()
                .enumerate()
                .find(|(_, name)| *name == column && name.as_str() != SOURCE_FILE_COLUMN)
                .map(|(idx, _)| idx)
                .ok_or_else(|| SchemaError::MissingColumn(column.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = table
        .rows
        .iter()
        .map(|row| {
            positions
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(Table {
        headers: schema.columns().to_vec(),
        rows,
    })
}

fn read_table(path: &Path) -> Result<Table, SchemaError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    Ok(Table { headers, rows })
}

fn write_table(table: &Table, path: &Path) -> Result<(), SchemaError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Reads `input_csv`, applies [`rename_and_reorder`] and writes the result.
/// Nothing is written when a schema column is missing.
pub fn fix_columns(input_csv: &Path, output_csv: &Path, schema: &ColumnSchema) -> Result<usize, SchemaError> {
    let table = read_table(input_csv)?;
    let fixed = rename_and_reorder(&table, schema)?;
    write_table(&fixed, output_csv)?;

    info!("Clean CSV saved as {}", output_csv.display());
    Ok(fixed.rows.len())
}
