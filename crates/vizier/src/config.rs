//! Top-level configuration, loadable from TOML.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, VizierError};
use crate::inference::{ClassifierConfig, PropertyConfig};
use crate::input::ParserConfig;
use crate::recommend::GeneratorConfig;

/// Configuration for every pipeline stage.
///
/// Any section left out of the TOML document keeps its defaults:
///
/// ```toml
/// [classifier]
/// sample_size = 50
/// randomize = false
///
/// [properties]
/// uniqueness_threshold = 0.9
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VizierConfig {
    pub parser: ParserConfig,
    pub classifier: ClassifierConfig,
    pub properties: PropertyConfig,
    pub generator: GeneratorConfig,
}

impl VizierConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: VizierConfig = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| VizierError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    fn check(&self) -> Result<()> {
        let threshold = self.properties.uniqueness_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(VizierError::Config(format!(
                "uniqueness_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.classifier.sample_size == 0 {
            return Err(VizierError::Config("sample_size must be positive".to_string()));
        }
        Ok(())
    }
}
