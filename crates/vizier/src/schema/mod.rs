//! Records describing inferred fields and datasets.

mod dataset;
mod field;
mod types;

pub use dataset::{DatasetProperties, HeaderRef, Structure, TimeSeries, TimeSeriesDetection};
pub use field::{FieldProperties, Normality};
pub use types::{FieldType, GeneralType};
