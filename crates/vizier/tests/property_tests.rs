//! Property-based tests for Vizier.
//!
//! These tests use proptest to generate random columns and tables and check
//! that the inference core keeps its invariants under all of them.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p vizier --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p vizier --test property_tests
//! ```

use proptest::prelude::*;

use vizier::inference::{
    detect_hierarchies, is_unique, parse_header_date, ClassifierConfig, FieldPropertyComputer,
    PropertyConfig, TypeClassifier,
};
use vizier::recommend::SpecGenerator;
use vizier::{DataTable, FieldProperties, FieldType};

// =============================================================================
// Test Strategies
// =============================================================================

/// Cell values drawn from every detector's territory.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,6}",
        "-?[0-9]{1,4}\\.[0-9]{1,5}",
        "(19|20)[0-9]{2}",
        "(true|false|yes|no|T|F)",
        "(France|Spain|Japan|FR|ES|USA|Europe|Asia)",
        "(Paris|London|Tokyo)",
        "(Jan|February|Mar|monday|Fri)",
        "20[0-2][0-9]-(0[1-9]|1[0-2])-(0[1-9]|1[0-9])",
        "[0-2][0-9]:[0-5][0-9]",
        "https?://[a-z]{3,10}\\.com",
        "[a-zA-Z ]{0,60}",
        Just(String::new()),
        Just("NA".to_string()),
    ]
}

fn header() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_]{1,12}",
        "(year|Month|is_active|birth_date|lat|lon|day_count)",
        "20[0-2][0-9](-0[1-9])?",
    ]
}

/// A small table with unique headers and rectangular rows.
fn table() -> impl Strategy<Value = DataTable> {
    (1usize..6, 1usize..25).prop_flat_map(|(cols, rows)| {
        (
            prop::collection::hash_set(header(), cols),
            prop::collection::vec(prop::collection::vec(cell(), cols), rows),
        )
            .prop_map(|(headers, rows)| {
                let headers: Vec<String> = headers.into_iter().collect();
                let width = headers.len();
                let rows = rows
                    .into_iter()
                    .map(|mut r| {
                        r.truncate(width);
                        r
                    })
                    .collect();
                DataTable::new(headers, rows)
            })
    })
}

fn computer() -> FieldPropertyComputer {
    FieldPropertyComputer::new(
        TypeClassifier::with_config(ClassifierConfig::deterministic()),
        PropertyConfig::default(),
    )
}

fn compute(table: &DataTable) -> Vec<FieldProperties> {
    computer().compute(table).expect("non-empty table")
}

// =============================================================================
// Classifier Properties
// =============================================================================

proptest! {
    /// The classifier never panics and always yields normalized scores.
    #[test]
    fn classifier_scores_are_normalized(
        name in header(),
        values in prop::collection::vec(cell(), 0..40),
    ) {
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let classification = TypeClassifier::new().classify(&name, &refs);

        let sum: f64 = classification.scores.values().sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "scores sum to {}", sum);
        prop_assert!(classification.scores.values().all(|s| *s >= 0.0));
        prop_assert!(classification.scores.contains_key(&classification.field_type));
        if classification.degenerate {
            prop_assert_eq!(classification.field_type, FieldType::String);
            prop_assert_eq!(classification.scores.len(), 1);
        }
    }

    /// The chosen type carries the highest score.
    #[test]
    fn classifier_picks_the_maximum(
        name in header(),
        values in prop::collection::vec(cell(), 1..30),
    ) {
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let classification = TypeClassifier::with_config(ClassifierConfig::deterministic()).classify(&name, &refs);
        let chosen = classification.scores[&classification.field_type];
        prop_assert!(classification.scores.values().all(|s| *s <= chosen));
    }

    /// Seeded random sampling is reproducible.
    #[test]
    fn seeded_sampling_is_reproducible(
        values in prop::collection::vec(cell(), 0..80),
        seed in any::<u64>(),
    ) {
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let config = ClassifierConfig { seed: Some(seed), ..ClassifierConfig::default() };
        let a = TypeClassifier::with_config(config.clone()).classify("col", &refs);
        let b = TypeClassifier::with_config(config).classify("col", &refs);
        prop_assert_eq!(a, b);
    }

    /// The header date parser never panics.
    #[test]
    fn header_date_parser_never_panics(s in "\\PC{0,30}") {
        let _ = parse_header_date(&s);
    }
}

// =============================================================================
// Field Property Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// General type is always the fixed mapping of the field type.
    #[test]
    fn general_type_follows_field_type(table in table()) {
        for field in compute(&table) {
            prop_assert_eq!(field.general_type(), field.field_type().general_type());
            prop_assert!(field.validate().is_ok());
        }
    }

    /// A child link always points at the next column, which is marked as a child.
    #[test]
    fn hierarchy_is_anti_symmetric(table in table()) {
        let fields = compute(&table);
        for (i, field) in fields.iter().enumerate() {
            if let Some(child) = &field.child {
                prop_assert_ne!(child, &field.name);
                let next = &fields[i + 1];
                prop_assert_eq!(&next.name, child);
                prop_assert!(next.is_child);
            }
            if field.is_child {
                prop_assert!(i > 0);
                prop_assert_eq!(fields[i - 1].child.as_deref(), Some(field.name.as_str()));
            }
        }
    }

    /// Re-running detection on computed fields changes nothing.
    #[test]
    fn hierarchy_detection_is_idempotent(table in table()) {
        let fields = compute(&table);
        let mut again = fields.clone();
        detect_hierarchies(&mut again, &table, &PropertyConfig::default());
        prop_assert_eq!(fields, again);
    }

    /// Deterministic runs agree on everything but the timestamps.
    #[test]
    fn computation_is_idempotent(table in table()) {
        let strip = |mut fields: Vec<FieldProperties>| {
            for f in &mut fields {
                f.created_at = chrono_epoch();
            }
            fields
        };
        prop_assert_eq!(strip(compute(&table)), strip(compute(&table)));
    }

    /// Uniqueness is monotone in the threshold.
    #[test]
    fn uniqueness_is_monotone(table in table(), lo in 0.0f64..1.0, delta in 0.0f64..0.5) {
        let hi = (lo + delta).min(1.0);
        for i in 0..table.column_count() {
            if is_unique(&table, i, hi) {
                prop_assert!(is_unique(&table, i, lo));
            }
        }
    }

    /// Every spec references existing fields and generation ignores input order.
    #[test]
    fn specs_reference_fields_and_ignore_order(table in table()) {
        let fields = compute(&table);
        let generator = SpecGenerator::new();
        let specs = generator.generate(&fields);

        for spec in &specs {
            prop_assert!(!spec.field_ids.is_empty());
            prop_assert!(spec.field_ids.iter().all(|id| *id < fields.len()));
            prop_assert!(!spec.viz_types.is_empty());
        }

        let mut reversed = fields.clone();
        reversed.reverse();
        prop_assert_eq!(specs, generator.generate(&reversed));
    }
}

fn chrono_epoch() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::UNIX_EPOCH
}
