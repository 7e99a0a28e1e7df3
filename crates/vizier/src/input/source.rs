//! Source metadata and the read-only table handed to the inference core.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VizierError};

/// Metadata about an uploaded data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// Parsed tabular data: ordered headers and row-major string cells.
///
/// The table is never mutated once built; every analysis step reads from it
/// and writes into freshly constructed records.
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from string slices. Handy for tests and small fixtures.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index. Missing cells read as "".
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Non-null values of a column, in row order.
    pub fn non_null_values(&self, index: usize) -> Vec<&str> {
        self.column_values(index)
            .filter(|v| !Self::is_null_value(v))
            .collect()
    }

    /// Distinct non-null values of a column, in first-seen order.
    pub fn distinct_values(&self, index: usize) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.column_values(index)
            .filter(|v| !Self::is_null_value(v))
            .filter(|v| seen.insert(*v))
            .collect()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| VizierError::UnknownColumn(name.to_string()))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Reject tables the pipeline cannot work on.
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.headers.is_empty() {
            return Err(VizierError::EmptyData("dataset has no columns".to_string()));
        }
        if self.rows.is_empty() {
            return Err(VizierError::EmptyData("dataset has no rows".to_string()));
        }
        Ok(())
    }

    /// Check if a value is one of the null sentinels.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed == "."
            || ["na", "n/a", "nan", "null", "none", "nil"]
                .iter()
                .any(|s| trimmed.eq_ignore_ascii_case(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        DataTable::from_rows(
            &["city", "pop"],
            &[&["Paris", "2100000"], &["NaN", ""], &["Lyon", "500000"], &["Paris", "NA"]],
        )
    }

    #[test]
    fn test_null_sentinels() {
        for v in ["", "  ", "NA", "n/a", "NaN", "null", "None", "nil", "."] {
            assert!(DataTable::is_null_value(v), "{v:?} should be null");
        }
        assert!(!DataTable::is_null_value("0"));
        assert!(!DataTable::is_null_value("Nancy"));
    }

    #[test]
    fn test_distinct_values_keep_first_seen_order() {
        let t = table();
        assert_eq!(t.distinct_values(0), vec!["Paris", "Lyon"]);
        assert_eq!(t.non_null_values(1), vec!["2100000", "500000"]);
    }

    #[test]
    fn test_column_index_unknown() {
        let t = table();
        assert_eq!(t.column_index("pop").unwrap(), 1);
        let err = t.column_index("area").unwrap_err();
        assert!(matches!(err, VizierError::UnknownColumn(ref c) if c == "area"));
    }

    #[test]
    fn test_ensure_not_empty() {
        assert!(table().ensure_not_empty().is_ok());
        let no_rows = DataTable::from_rows(&["a"], &[]);
        assert!(no_rows.ensure_not_empty().unwrap_err().is_input_error());
        let no_cols = DataTable::new(Vec::new(), Vec::new());
        assert!(no_cols.ensure_not_empty().is_err());
    }
}
