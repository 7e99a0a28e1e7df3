//! Per-column property computation over a whole dataset.

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::classifier::TypeClassifier;
use super::hierarchy::detect_hierarchies;
use super::normality::{column_normality, NormalityOutcome};
use crate::error::Result;
use crate::input::DataTable;
use crate::schema::{FieldProperties, FieldType};

/// Thresholds for property computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyConfig {
    /// Distinct/total ratio at or above which a column counts as unique.
    pub uniqueness_threshold: f64,
    /// Maximum distinct parent values examined per hierarchy check.
    pub hierarchy_value_cap: usize,
    /// Child value ignored by hierarchy checks.
    pub hierarchy_unknown_marker: String,
    /// Minimum numeric values before a normality test is attempted.
    pub normality_min_samples: usize,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            uniqueness_threshold: 0.95,
            hierarchy_value_cap: 100,
            hierarchy_unknown_marker: "#".to_string(),
            normality_min_samples: 8,
        }
    }
}

/// Builds one [`FieldProperties`] per column.
pub struct FieldPropertyComputer {
    classifier: TypeClassifier,
    config: PropertyConfig,
}

impl FieldPropertyComputer {
    pub fn new(classifier: TypeClassifier, config: PropertyConfig) -> Self {
        Self { classifier, config }
    }

    pub fn config(&self) -> &PropertyConfig {
        &self.config
    }

    /// Compute properties for every column, in column order.
    ///
    /// Only structurally empty tables are errors; per-column statistical
    /// failures are recorded on the column and the batch carries on.
    #[instrument(skip_all, fields(columns = table.column_count(), rows = table.row_count()))]
    pub fn compute(&self, table: &DataTable) -> Result<Vec<FieldProperties>> {
        table.ensure_not_empty()?;
        info!("computing field properties");

        let start = Instant::now();
        let mut fields: Vec<FieldProperties> = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values = table.non_null_values(i);
                let classification = self.classifier.classify(name, &values);
                if classification.degenerate {
                    debug!(field = %name, "no type evidence, defaulting to string");
                }
                FieldProperties::new(i, name, classification.field_type, classification.scores)
            })
            .collect();
        info!(elapsed = ?start.elapsed(), "field type detection");

        let start = Instant::now();
        for field in fields.iter_mut().filter(|f| f.is_quantitative()) {
            match column_normality(table, field.index, self.config.normality_min_samples) {
                NormalityOutcome::Tested(n) => field.normality = Some(n),
                NormalityOutcome::Unavailable(reason) => {
                    debug!(field = %field.name, %reason, "normality unavailable");
                }
            }
        }
        info!(elapsed = ?start.elapsed(), "normality analysis");

        let start = Instant::now();
        for field in &mut fields {
            field.is_unique = is_unique(table, field.index, self.config.uniqueness_threshold);
        }
        info!(elapsed = ?start.elapsed(), "unique detection");

        let start = Instant::now();
        for field in &mut fields {
            if !field.field_type().suppresses_unique_values() {
                field.unique_values = table
                    .distinct_values(field.index)
                    .into_iter()
                    .map(String::from)
                    .collect();
            }
            field.contiguous =
                field.field_type() == FieldType::Integer && is_contiguous(table, field.index);
        }
        info!(elapsed = ?start.elapsed(), "unique values");

        let start = Instant::now();
        detect_hierarchies(&mut fields, table, &self.config);
        info!(elapsed = ?start.elapsed(), "hierarchies");

        Ok(fields)
    }
}

impl Default for FieldPropertyComputer {
    fn default() -> Self {
        Self::new(TypeClassifier::default(), PropertyConfig::default())
    }
}

/// Whether distinct/total reaches `threshold`. Null cells count as one shared value.
pub fn is_unique(table: &DataTable, index: usize, threshold: f64) -> bool {
    let total = table.row_count();
    if total == 0 {
        return false;
    }
    let distinct: HashSet<&str> = table
        .column_values(index)
        .map(|v| if DataTable::is_null_value(v) { "" } else { v })
        .collect();
    distinct.len() as f64 / total as f64 >= threshold
}

/// Whether the sorted distinct integers form an unbroken +1 sequence.
fn is_contiguous(table: &DataTable, index: usize) -> bool {
    let mut values = Vec::new();
    for v in table.non_null_values(index) {
        match v.trim().parse::<i64>() {
            Ok(n) => values.push(n),
            Err(_) => return false,
        }
    }
    if values.is_empty() {
        return false;
    }
    values.sort_unstable();
    values.dedup();
    values.windows(2).all(|w| w[1] == w[0] + 1)
}
