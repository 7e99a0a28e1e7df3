//! Error types for the vizier library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vizier operations.
#[derive(Debug, Error)]
pub enum VizierError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty dataset: no rows, no columns, or nothing to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A referenced column does not exist in the dataset.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A record failed validation before being persisted.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Another ingestion of the same dataset holds the write lock.
    #[error("Persistence conflict for dataset '{dataset_id}': another write is in progress")]
    PersistenceConflict { dataset_id: String },

    /// Error reading or writing persisted properties.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl VizierError {
    /// Returns true for errors caused by the input dataset itself.
    ///
    /// These abort the pipeline before anything is written.
    pub fn is_input_error(&self) -> bool {
        matches!(self, VizierError::EmptyData(_) | VizierError::UnknownColumn(_))
    }

    /// Returns true when retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VizierError::PersistenceConflict { .. })
    }
}

/// Result type alias for vizier operations.
pub type Result<T> = std::result::Result<T, VizierError>;
