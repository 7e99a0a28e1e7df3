//! Field type inference and dataset-level property detection.

mod classifier;
mod detectors;
mod hierarchy;
mod normality;
mod properties;
mod structure;

pub use classifier::{Classification, ClassifierConfig, TypeClassifier};
pub use detectors::{BuiltinDetector, DetectorRegistry, TypeDetector};
pub use hierarchy::{attributes, detect_hierarchies, entity_trees, EntityTree};
pub use normality::{column_normality, normality_test, NormalityOutcome};
pub use properties::{is_unique, FieldPropertyComputer, PropertyConfig};
pub use structure::{detect_time_series, parse_header_date};
