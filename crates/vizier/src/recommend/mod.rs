//! Visualization specification generation.
//!
//! Given typed field properties, [`SpecGenerator`] enumerates candidate
//! visualizations by applying the rules of a [`RuleTable`] in order.

mod generator;
mod rules;
mod spec;

pub use generator::{Aggregation, BinningProcedure, GeneratorConfig, SpecGenerator};
pub use rules::{Arity, FieldBuckets, Rule, RuleFn, RuleTable};
pub use spec::{
    GeneratingProcedure, Labels, SpecMeta, Term, TermType, TypeStructure, VisualizationSpec, VizType,
};
