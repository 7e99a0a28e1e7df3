//! Vizier: field-type inference and visualization recommendation for tabular datasets.
//!
//! Given a table, vizier classifies every column into a fine-grained
//! [`FieldType`], computes per-column properties (uniqueness, distinct
//! values, normality, parent/child hierarchies), detects whether the
//! dataset is wide (time-indexed headers) or long, and enumerates candidate
//! [`VisualizationSpec`]s from the typed fields.
//!
//! # Example
//!
//! ```no_run
//! use vizier::Vizier;
//!
//! let vizier = Vizier::new();
//! let analysis = vizier.analyze("employees.csv").unwrap();
//!
//! for field in &analysis.fields {
//!     println!("{}: {}", field.name, field.field_type());
//! }
//! println!("{} candidate visualizations", analysis.specs.len());
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod input;
pub mod recommend;
pub mod schema;
pub mod store;
pub mod task;

mod vizier;

pub use crate::vizier::{Analysis, AnalysisSummary, Vizier};
pub use config::VizierConfig;
pub use error::{Result, VizierError};
pub use input::{DataTable, SourceMetadata};
pub use recommend::{SpecGenerator, VisualizationSpec};
pub use schema::{DatasetProperties, FieldProperties, FieldType, GeneralType, Structure};
pub use store::{JsonStore, MemoryStore, PropertyStore};
pub use task::{RecordingReporter, StatusReporter, TaskState, TaskStatus, TracingReporter};
