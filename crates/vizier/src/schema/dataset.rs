//! Dataset-level property record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::FieldType;
use crate::error::{Result, VizierError};

/// Shape of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    /// Time-indexed columns spread across the header row.
    Wide,
    /// One row per observation.
    Long,
}

/// A header position referenced by a time-series detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRef {
    pub index: usize,
    pub name: String,
}

/// Extent of a detected time-series header block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub num_elements: usize,
    /// Duration between the first and last header of the block.
    pub length_in_seconds: f64,
    /// `length_in_seconds / num_elements`, assuming uniform spacing.
    pub interval_seconds: f64,
    /// Header names in the block.
    pub names: Vec<String>,
}

/// A contiguous block of date-like headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesDetection {
    pub start: HeaderRef,
    pub end: HeaderRef,
    pub time_series: TimeSeries,
}

/// Whole-dataset properties. Replaced wholesale on re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProperties {
    pub n_rows: usize,
    pub n_cols: usize,
    pub field_names: Vec<String>,
    /// Parallel to `field_names`.
    pub field_types: Vec<FieldType>,
    pub field_accessors: Vec<usize>,
    pub structure: Structure,
    pub is_time_series: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time_series: Option<TimeSeriesDetection>,
    pub created_at: DateTime<Utc>,
}

impl DatasetProperties {
    /// Assemble the record; structure follows from whether a time series was found.
    pub fn new(
        n_rows: usize,
        field_names: Vec<String>,
        field_types: Vec<FieldType>,
        time_series: Option<TimeSeriesDetection>,
    ) -> Self {
        let n_cols = field_names.len();
        let structure = if time_series.is_some() {
            Structure::Wide
        } else {
            Structure::Long
        };

        Self {
            n_rows,
            n_cols,
            field_names,
            field_types,
            field_accessors: (0..n_cols).collect(),
            structure,
            is_time_series: time_series.is_some(),
            time_series,
            created_at: Utc::now(),
        }
    }

    /// Check the record's invariants before it is persisted.
    pub fn validate(&self) -> Result<()> {
        if self.field_names.len() != self.n_cols
            || self.field_types.len() != self.n_cols
            || self.field_accessors.len() != self.n_cols
        {
            return Err(VizierError::InvalidRecord(format!(
                "dataset has {} columns but {} names, {} types and {} accessors",
                self.n_cols,
                self.field_names.len(),
                self.field_types.len(),
                self.field_accessors.len()
            )));
        }

        if self.is_time_series != self.time_series.is_some()
            || (self.structure == Structure::Wide) != self.is_time_series
        {
            return Err(VizierError::InvalidRecord(
                "structure and time-series fields disagree".to_string(),
            ));
        }

        if let Some(ts) = &self.time_series {
            if ts.start.index > ts.end.index || ts.end.index >= self.n_cols {
                return Err(VizierError::InvalidRecord(format!(
                    "time-series block {}..={} is outside the dataset",
                    ts.start.index, ts.end.index
                )));
            }
        }

        Ok(())
    }
}
