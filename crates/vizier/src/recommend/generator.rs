//! Specification generator: runs the rule table over a set of typed fields.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::rules::{FieldBuckets, RuleTable};
use super::spec::VisualizationSpec;
use crate::schema::FieldProperties;

/// Aggregation function named in generated specs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Min,
    Max,
    Mean,
    Count,
}

impl Aggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Mean => "mean",
            Aggregation::Count => "count",
        }
    }

    /// Capitalized form for axis labels.
    pub fn label(self) -> &'static str {
        match self {
            Aggregation::Sum => "Sum",
            Aggregation::Min => "Min",
            Aggregation::Max => "Max",
            Aggregation::Mean => "Mean",
            Aggregation::Count => "Count",
        }
    }
}

/// A binning procedure. Procedures not marked implemented are never emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinningProcedure {
    pub name: String,
    pub implemented: bool,
}

impl BinningProcedure {
    fn new(name: &str, implemented: bool) -> Self {
        Self {
            name: name.to_string(),
            implemented,
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub aggregations: Vec<Aggregation>,
    pub binning_procedures: Vec<BinningProcedure>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            aggregations: vec![
                Aggregation::Sum,
                Aggregation::Min,
                Aggregation::Max,
                Aggregation::Mean,
                Aggregation::Count,
            ],
            binning_procedures: vec![
                BinningProcedure::new("freedman", true),
                BinningProcedure::new("sturges", false),
                BinningProcedure::new("scott", false),
                BinningProcedure::new("shimazaki", false),
                BinningProcedure::new("bayesian", false),
            ],
        }
    }
}

impl GeneratorConfig {
    /// Names of the implemented binning procedures, in configured order.
    pub fn implemented_binning(&self) -> impl Iterator<Item = &str> {
        self.binning_procedures
            .iter()
            .filter(|b| b.implemented)
            .map(|b| b.name.as_str())
    }
}

/// Enumerates candidate visualizations for a set of field properties.
///
/// Output is in rule-declaration order. There is no relevance scoring
/// across rules.
pub struct SpecGenerator {
    rules: RuleTable,
    config: GeneratorConfig,
}

impl SpecGenerator {
    pub fn new() -> Self {
        Self::with_rules(RuleTable::standard(), GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Self::with_rules(RuleTable::standard(), config)
    }

    pub fn with_rules(rules: RuleTable, config: GeneratorConfig) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Generate specs. The order of `fields` does not affect the result.
    #[instrument(skip_all, fields(fields = fields.len()))]
    pub fn generate(&self, fields: &[FieldProperties]) -> Vec<VisualizationSpec> {
        let buckets = FieldBuckets::new(fields);
        let mut specs = Vec::new();
        for rule in self.rules.rules() {
            let emitted = (rule.apply)(&buckets, &self.config);
            debug!(rule = rule.name, count = emitted.len(), "applied rule");
            specs.extend(emitted);
        }
        specs
    }
}

impl Default for SpecGenerator {
    fn default() -> Self {
        Self::new()
    }
}
