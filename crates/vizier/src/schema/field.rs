//! Per-column property record.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{FieldType, GeneralType};
use crate::error::{Result, VizierError};

/// Tolerance used when checking that type scores sum to one.
const SCORE_SUM_TOLERANCE: f64 = 1e-9;

/// Outcome of a D'Agostino-Pearson normality test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normality {
    /// K² statistic (sum of squared skewness and kurtosis z-scores).
    pub statistic: f64,
    /// Chi-square (2 df) survival probability of the statistic.
    pub p_value: f64,
}

impl Normality {
    /// Whether normality is not rejected at the given significance level.
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// Everything inferred about one column of a dataset.
///
/// `field_type` and `general_type` are private so the general type can only
/// ever be derived from the field type through [`FieldType::general_type`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProperties {
    /// Zero-based column position.
    pub index: usize,
    /// Column header.
    pub name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    /// Normalized evidence per candidate type.
    pub type_scores: IndexMap<FieldType, f64>,
    general_type: GeneralType,
    /// Ratio of distinct to total values reached the uniqueness threshold.
    pub is_unique: bool,
    /// Distinct non-null values; empty for numeric and datetime fields.
    #[serde(default)]
    pub unique_values: Vec<String>,
    /// Name of the adjacent column this one is a parent of.
    pub child: Option<String>,
    /// Whether the previous column is a parent of this one.
    pub is_child: bool,
    /// Normality test result for quantitative fields.
    pub normality: Option<Normality>,
    /// Integer values form an unbroken +1 sequence.
    pub contiguous: bool,
    /// A user has overridden the inferred type.
    pub manual: bool,
    pub created_at: DateTime<Utc>,
}

impl FieldProperties {
    /// Create a record with the given type and scores and default everything else.
    pub fn new(
        index: usize,
        name: impl Into<String>,
        field_type: FieldType,
        type_scores: IndexMap<FieldType, f64>,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            field_type,
            type_scores,
            general_type: field_type.general_type(),
            is_unique: false,
            unique_values: Vec::new(),
            child: None,
            is_child: false,
            normality: None,
            contiguous: false,
            manual: false,
            created_at: Utc::now(),
        }
    }

    /// Record with a single, fully confident type score.
    pub fn with_type(index: usize, name: impl Into<String>, field_type: FieldType) -> Self {
        Self::new(index, name, field_type, IndexMap::from([(field_type, 1.0)]))
    }

    /// Set the uniqueness flag.
    pub fn with_unique(mut self, is_unique: bool) -> Self {
        self.is_unique = is_unique;
        self
    }

    /// Set the distinct values.
    pub fn with_unique_values(mut self, values: Vec<String>) -> Self {
        self.unique_values = values;
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn general_type(&self) -> GeneralType {
        self.general_type
    }

    /// Apply a user override. Automated re-inference will not replace it.
    pub fn override_type(&mut self, field_type: FieldType) {
        self.field_type = field_type;
        self.general_type = field_type.general_type();
        self.manual = true;
    }

    /// Carry a manual override from a previously stored record into this one.
    pub fn keep_manual_override(&mut self, previous: &FieldProperties) {
        if previous.manual {
            self.override_type(previous.field_type);
        }
    }

    pub fn is_quantitative(&self) -> bool {
        self.general_type == GeneralType::Quantitative
    }

    /// Check the record's invariants before it is persisted.
    pub fn validate(&self) -> Result<()> {
        if self.general_type != self.field_type.general_type() {
            return Err(VizierError::InvalidRecord(format!(
                "field '{}' has general type {:?} inconsistent with type {}",
                self.name, self.general_type, self.field_type
            )));
        }

        if self.type_scores.values().any(|s| *s < 0.0 || !s.is_finite()) {
            return Err(VizierError::InvalidRecord(format!(
                "field '{}' has a negative or non-finite type score",
                self.name
            )));
        }

        let sum: f64 = self.type_scores.values().sum();
        if (sum - 1.0).abs() > SCORE_SUM_TOLERANCE {
            return Err(VizierError::InvalidRecord(format!(
                "field '{}' type scores sum to {sum}, expected 1",
                self.name
            )));
        }

        if self.child.as_deref() == Some(self.name.as_str()) {
            return Err(VizierError::InvalidRecord(format!(
                "field '{}' cannot be its own child",
                self.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_sets_general_type_and_manual() {
        let mut field = FieldProperties::with_type(0, "zip", FieldType::Integer);
        assert_eq!(field.general_type(), GeneralType::Quantitative);

        field.override_type(FieldType::String);
        assert_eq!(field.field_type(), FieldType::String);
        assert_eq!(field.general_type(), GeneralType::Categorical);
        assert!(field.manual);
    }

    #[test]
    fn test_keep_manual_override() {
        let mut previous = FieldProperties::with_type(0, "zip", FieldType::Integer);
        previous.override_type(FieldType::String);

        let mut fresh = FieldProperties::with_type(0, "zip", FieldType::Integer);
        fresh.keep_manual_override(&previous);
        assert_eq!(fresh.field_type(), FieldType::String);
        assert!(fresh.manual);

        let untouched = FieldProperties::with_type(0, "zip", FieldType::Decimal);
        let mut other = FieldProperties::with_type(0, "zip", FieldType::Integer);
        other.keep_manual_override(&untouched);
        assert_eq!(other.field_type(), FieldType::Integer);
        assert!(!other.manual);
    }

    #[test]
    fn test_validate() {
        let field = FieldProperties::with_type(0, "a", FieldType::String);
        assert!(field.validate().is_ok());

        let mut bad_scores = field.clone();
        bad_scores.type_scores.insert(FieldType::Integer, 0.5);
        assert!(bad_scores.validate().is_err());

        let mut own_child = field.clone();
        own_child.child = Some("a".to_string());
        assert!(own_child.validate().is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let field = FieldProperties::with_type(2, "country", FieldType::CountryCode2);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "country_code_2");
        assert_eq!(json["general_type"], "c");
        assert_eq!(json["type_scores"]["country_code_2"], 1.0);

        let back: FieldProperties = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }
}
