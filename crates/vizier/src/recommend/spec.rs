//! Visualization specification types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The rule that produced a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratingProcedure {
    /// Values plotted against their row index.
    #[serde(rename = "ind:val")]
    IndexValue,
    /// Count of each distinct value.
    #[serde(rename = "val:count")]
    ValueCount,
    /// Aggregate over bins of a field.
    #[serde(rename = "bin:agg")]
    BinAggregate,
    /// Group by one field and aggregate another.
    #[serde(rename = "val:agg")]
    ValueAggregate,
    /// Raw values of two fields against each other.
    #[serde(rename = "val:val")]
    ValueValue,
    /// Group by one field and aggregate two others.
    #[serde(rename = "agg:agg")]
    AggregateAggregate,
    /// Count by several grouping fields.
    #[serde(rename = "multigroup:count")]
    MultigroupCount,
    /// Connect two categorical fields, weighted by quantitative attributes.
    #[serde(rename = "val:val:q")]
    ValueValueQuantity,
}

impl GeneratingProcedure {
    pub fn as_str(self) -> &'static str {
        match self {
            GeneratingProcedure::IndexValue => "ind:val",
            GeneratingProcedure::ValueCount => "val:count",
            GeneratingProcedure::BinAggregate => "bin:agg",
            GeneratingProcedure::ValueAggregate => "val:agg",
            GeneratingProcedure::ValueValue => "val:val",
            GeneratingProcedure::AggregateAggregate => "agg:agg",
            GeneratingProcedure::MultigroupCount => "multigroup:count",
            GeneratingProcedure::ValueValueQuantity => "val:val:q",
        }
    }
}

/// Arity and general-type shape consumed by a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeStructure {
    #[serde(rename = "c")]
    C,
    #[serde(rename = "q")]
    Q,
    #[serde(rename = "c:q")]
    CQ,
    #[serde(rename = "q:q")]
    QQ,
    #[serde(rename = "t:q")]
    TQ,
    /// Binned field against a quantity.
    #[serde(rename = "b:q")]
    BQ,
    /// List of categorical fields against a quantity.
    #[serde(rename = "[c]:q")]
    ListCQ,
}

impl TypeStructure {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeStructure::C => "c",
            TypeStructure::Q => "q",
            TypeStructure::CQ => "c:q",
            TypeStructure::QQ => "q:q",
            TypeStructure::TQ => "t:q",
            TypeStructure::BQ => "b:q",
            TypeStructure::ListCQ => "[c]:q",
        }
    }
}

/// Renderer hint. The first hint on a spec is the preferred one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VizType {
    Bar,
    Pie,
    Tree,
    Hist,
    Scatter,
    Line,
    StackedBar,
    Network,
}

/// Role of a token in a spec's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermType {
    Field,
    Operation,
    Plain,
    Transformation,
}

/// One token of a description, tagged for UI reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub string: String,
    #[serde(rename = "type")]
    pub term_type: TermType,
}

impl Term {
    pub fn field(s: impl Into<String>) -> Self {
        Self::new(s, TermType::Field)
    }

    pub fn operation(s: impl Into<String>) -> Self {
        Self::new(s, TermType::Operation)
    }

    pub fn plain(s: impl Into<String>) -> Self {
        Self::new(s, TermType::Plain)
    }

    pub fn transformation(s: impl Into<String>) -> Self {
        Self::new(s, TermType::Transformation)
    }

    fn new(s: impl Into<String>, term_type: TermType) -> Self {
        Self {
            string: s.into(),
            term_type,
        }
    }
}

/// Axis labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    pub x: String,
    pub y: String,
}

/// Human-readable description of a spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecMeta {
    pub desc: String,
    pub construction: Vec<Term>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub labels: Option<Labels>,
}

impl SpecMeta {
    /// Build the description by joining the construction tokens.
    pub fn from_terms(construction: Vec<Term>) -> Self {
        let desc = construction
            .iter()
            .map(|t| t.string.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            desc,
            construction,
            labels: None,
        }
    }

    pub fn with_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.labels = Some(Labels {
            x: x.into(),
            y: y.into(),
        });
        self
    }
}

/// A candidate visualization. Generated fresh and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSpec {
    pub generating_procedure: GeneratingProcedure,
    pub type_structure: TypeStructure,
    pub viz_types: Vec<VizType>,
    /// Indices of the consumed field property records.
    pub field_ids: Vec<usize>,
    /// Generator-specific parameters.
    pub args: Value,
    pub meta: SpecMeta,
}
