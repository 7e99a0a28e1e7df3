//! Weighted-evidence field type classification.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::detectors::DetectorRegistry;
use crate::schema::FieldType;

/// Header keywords that hint at a type. Boolean hints only match as a prefix.
const HEADER_HINTS: &[(FieldType, &[&str])] = &[
    (FieldType::Year, &["year", "Year"]),
    (FieldType::Month, &["month", "Month"]),
    (FieldType::Day, &["day", "Days"]),
    (FieldType::Boolean, &["is"]),
    (FieldType::Datetime, &["date", "Date", "time", "Time"]),
    (FieldType::Latitude, &["lat", "Lat"]),
    (FieldType::Longitude, &["lon", "Lon", "lng", "Lng"]),
];

/// Classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum number of values scored per column.
    pub sample_size: usize,
    /// Sample randomly instead of taking the first `sample_size` values.
    pub randomize: bool,
    /// Seed for random sampling.
    pub seed: Option<u64>,
    /// Score added per matching header keyword.
    pub header_bonus: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sample_size: 20,
            randomize: true,
            seed: None,
            header_bonus: 20,
        }
    }
}

impl ClassifierConfig {
    /// Deterministic configuration: first values, no randomness.
    pub fn deterministic() -> Self {
        Self {
            randomize: false,
            ..Self::default()
        }
    }
}

/// The result of classifying one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub field_type: FieldType,
    /// Normalized scores, summing to one.
    pub scores: IndexMap<FieldType, f64>,
    /// No evidence at all; resolved to `string`.
    pub degenerate: bool,
}

/// Assigns a field type from a column's header and sampled values.
pub struct TypeClassifier {
    registry: DetectorRegistry,
    config: ClassifierConfig,
}

impl TypeClassifier {
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self::with_registry(DetectorRegistry::standard(), config)
    }

    /// Classify against a custom set of detectors.
    pub fn with_registry(registry: DetectorRegistry, config: ClassifierConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a column. `values` should already exclude nulls.
    ///
    /// The accumulation order is `string` followed by the registry's types;
    /// the first type with the maximum raw score wins.
    pub fn classify(&self, field_name: &str, values: &[&str]) -> Classification {
        let sample = self.sample(values);

        let mut raw: IndexMap<FieldType, u32> = IndexMap::new();
        raw.insert(FieldType::String, 0);
        for t in self.registry.field_types() {
            raw.entry(t).or_insert(0);
        }

        for (field_type, keywords) in HEADER_HINTS {
            let Some(score) = raw.get_mut(field_type) else {
                continue;
            };
            for keyword in keywords.iter() {
                let hit = if *field_type == FieldType::Boolean {
                    field_name.starts_with(keyword)
                } else {
                    field_name.contains(keyword)
                };
                if hit {
                    *score += self.config.header_bonus;
                }
            }
        }

        for value in &sample {
            for detector in self.registry.detectors() {
                if detector.test(value) {
                    *raw.entry(detector.field_type()).or_insert(0) += detector.weight();
                }
            }
        }

        let total: u32 = raw.values().sum();
        if total == 0 {
            return Classification {
                field_type: FieldType::String,
                scores: IndexMap::from([(FieldType::String, 1.0)]),
                degenerate: true,
            };
        }

        let mut best = (FieldType::String, 0u32);
        for (&t, &score) in &raw {
            if score > best.1 {
                best = (t, score);
            }
        }

        let scores = raw
            .into_iter()
            .map(|(t, s)| (t, f64::from(s) / f64::from(total)))
            .collect();

        Classification {
            field_type: best.0,
            scores,
            degenerate: false,
        }
    }

    /// Take `min(len, sample_size)` values, randomly without replacement or from the front.
    fn sample<'a>(&self, values: &[&'a str]) -> Vec<&'a str> {
        let n = values.len().min(self.config.sample_size);
        if !self.config.randomize || n == values.len() {
            return values[..n].to_vec();
        }

        let mut rng = match self.config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        // Partial Fisher-Yates over the indices.
        let mut indices: Vec<usize> = (0..values.len()).collect();
        for i in 0..n {
            let j = rng.usize(i..indices.len());
            indices.swap(i, j);
        }
        indices[..n].iter().map(|&i| values[i]).collect()
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deterministic() -> TypeClassifier {
        TypeClassifier::with_config(ClassifierConfig::deterministic())
    }

    fn assert_normalized(c: &Classification) {
        let sum: f64 = c.scores.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "scores sum to {sum}");
    }

    #[test]
    fn test_year_header_beats_integer() {
        let c = deterministic().classify("Year", &["1999", "2001", "2003"]);
        assert_eq!(c.field_type, FieldType::Year);
        assert!(c.scores[&FieldType::Year] > c.scores[&FieldType::Integer]);
        assert_normalized(&c);
    }

    #[test]
    fn test_integers() {
        let c = deterministic().classify("count", &["1", "2", "3", "40"]);
        assert_eq!(c.field_type, FieldType::Integer);
        assert!(!c.degenerate);
        assert_normalized(&c);
    }

    #[test]
    fn test_decimals() {
        let c = deterministic().classify("price", &["1.5", "2.25", "3.0"]);
        assert_eq!(c.field_type, FieldType::Decimal);
    }

    #[test]
    fn test_plain_strings() {
        let c = deterministic().classify("name", &["Alice", "Bob", "Carol"]);
        assert_eq!(c.field_type, FieldType::String);
        assert_normalized(&c);
    }

    #[test]
    fn test_boolean_prefix_header() {
        let c = deterministic().classify("is_active", &["true", "false", "true"]);
        assert_eq!(c.field_type, FieldType::Boolean);

        // "this" contains "is" but does not start with it
        let c = deterministic().classify("this", &["abc", "xyz"]);
        assert_eq!(c.field_type, FieldType::String);
    }

    #[test]
    fn test_empty_values_are_degenerate() {
        let c = deterministic().classify("empty", &[]);
        assert_eq!(c.field_type, FieldType::String);
        assert!(c.degenerate);
        assert_eq!(c.scores.len(), 1);
        assert_eq!(c.scores[&FieldType::String], 1.0);
    }

    #[test]
    fn test_reduced_registry() {
        let registry = DetectorRegistry::with_types(&[FieldType::Integer]);
        let classifier = TypeClassifier::with_registry(registry, ClassifierConfig::deterministic());

        let c = classifier.classify("Year", &["1999", "2001"]);
        // year is not registered, so the header hint has nowhere to go
        assert_eq!(c.field_type, FieldType::Integer);
        assert_eq!(c.scores.len(), 2);

        let c = classifier.classify("name", &["Alice"]);
        assert!(c.degenerate);
    }

    #[test]
    fn test_ties_resolve_in_registry_order() {
        let registry = DetectorRegistry::with_types(&[FieldType::Latitude, FieldType::Longitude]);
        let classifier = TypeClassifier::with_registry(registry, ClassifierConfig::deterministic());
        let c = classifier.classify("coord", &["45.12345", "46.54321"]);
        assert_eq!(c.field_type, FieldType::Latitude);
    }

    #[test]
    fn test_deterministic_sampling_takes_prefix() {
        let config = ClassifierConfig {
            sample_size: 2,
            ..ClassifierConfig::deterministic()
        };
        let classifier = TypeClassifier::with_config(config);
        let c = classifier.classify("mixed", &["1", "2", "x", "y", "z"]);
        assert_eq!(c.field_type, FieldType::Integer);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let config = ClassifierConfig {
            sample_size: 3,
            seed: Some(7),
            ..ClassifierConfig::default()
        };
        let classifier = TypeClassifier::with_config(config);
        let values = ["1", "a", "2", "b", "3", "c", "4", "d"];
        let first = classifier.classify("v", &values);
        let second = classifier.classify("v", &values);
        assert_eq!(first, second);
    }
}
