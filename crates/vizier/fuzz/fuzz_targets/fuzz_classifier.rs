//! Fuzz target for the type classifier.
//!
//! Checks that classification never panics and that scores stay normalized.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vizier::inference::{ClassifierConfig, TypeClassifier};

#[derive(Debug, Arbitrary)]
struct Input {
    name: String,
    values: Vec<String>,
    sample_size: u8,
    seed: u64,
}

fuzz_target!(|input: Input| {
    let classifier = TypeClassifier::with_config(ClassifierConfig {
        sample_size: usize::from(input.sample_size).max(1),
        seed: Some(input.seed),
        ..ClassifierConfig::default()
    });
    let values: Vec<&str> = input.values.iter().map(String::as_str).collect();
    let classification = classifier.classify(&input.name, &values);

    let sum: f64 = classification.scores.values().sum();
    assert!((sum - 1.0).abs() < 1e-9, "scores sum to {}", sum);
});
