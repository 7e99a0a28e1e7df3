//! Generator rules, keyed by the arity and general types of their input.
//!
//! Each rule is a pure function from the bucketed fields to the specs it
//! emits. Rules run in declaration order and nothing reorders their output.

use serde_json::{json, Value};

use super::generator::{Aggregation, GeneratorConfig};
use super::spec::{
    GeneratingProcedure as GP, SpecMeta, Term, TypeStructure as TS, VisualizationSpec, VizType as VT,
};
use crate::schema::{FieldProperties, GeneralType};

/// Fields partitioned by general type, each bucket sorted by column index.
#[derive(Debug, Default)]
pub struct FieldBuckets<'a> {
    pub q: Vec<&'a FieldProperties>,
    pub c: Vec<&'a FieldProperties>,
    pub t: Vec<&'a FieldProperties>,
}

impl<'a> FieldBuckets<'a> {
    pub fn new(fields: &'a [FieldProperties]) -> Self {
        let mut buckets = Self::default();
        for field in fields {
            match field.general_type() {
                GeneralType::Quantitative => buckets.q.push(field),
                GeneralType::Categorical => buckets.c.push(field),
                GeneralType::Temporal => buckets.t.push(field),
            }
        }
        for bucket in [&mut buckets.q, &mut buckets.c, &mut buckets.t] {
            bucket.sort_by_key(|f| f.index);
        }
        buckets
    }

    /// Non-unique categorical fields.
    fn grouping_c(&self) -> Vec<&'a FieldProperties> {
        self.c.iter().copied().filter(|f| !f.is_unique).collect()
    }
}

/// How many fields a rule consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Arity {
    Single,
    Pair,
    Multi,
}

pub type RuleFn = fn(&FieldBuckets<'_>, &GeneratorConfig) -> Vec<VisualizationSpec>;

/// A named generator rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub arity: Arity,
    pub apply: RuleFn,
}

/// Ordered rule table.
#[derive(Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Single-field rules, then pairwise, then multi-field.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                Rule { name: "single_q", arity: Arity::Single, apply: single_q },
                Rule { name: "single_c", arity: Arity::Single, apply: single_c },
                Rule { name: "single_t", arity: Arity::Single, apply: single_t },
                Rule { name: "pair_cc", arity: Arity::Pair, apply: pair_cc },
                Rule { name: "pair_qq", arity: Arity::Pair, apply: pair_qq },
                Rule { name: "pair_cq", arity: Arity::Pair, apply: pair_cq },
                Rule { name: "pair_tq", arity: Arity::Pair, apply: pair_tq },
                Rule { name: "multi_c", arity: Arity::Multi, apply: multi_c },
                Rule { name: "multi_cq", arity: Arity::Multi, apply: multi_cq },
                Rule { name: "connect", arity: Arity::Multi, apply: connect },
            ],
        }
    }

    /// The standard rules restricted to `names`, keeping standard order.
    pub fn only(names: &[&str]) -> Self {
        let mut table = Self::standard();
        table.rules.retain(|r| names.contains(&r.name));
        table
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Unordered pairs, in slice order.
fn pairs<T: Copy>(items: &[T]) -> impl Iterator<Item = (T, T)> + '_ {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, &a)| items[i + 1..].iter().map(move |&b| (a, b)))
}

fn field_ref(field: &FieldProperties) -> Value {
    json!({ "id": field.index, "name": field.name })
}

// =============================================================================
// SINGLE-FIELD RULES
// =============================================================================

fn single_q(buckets: &FieldBuckets<'_>, config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    let mut specs = Vec::new();
    for &q in &buckets.q {
        specs.push(VisualizationSpec {
            generating_procedure: GP::IndexValue,
            type_structure: TS::QQ,
            viz_types: vec![VT::Line, VT::Scatter],
            field_ids: vec![q.index],
            args: json!({ "field_a": field_ref(q) }),
            meta: SpecMeta::from_terms(vec![Term::field(&q.name), Term::plain("by index")])
                .with_labels("Index", &q.name),
        });

        if !q.is_unique {
            specs.push(value_count(q, vec![VT::Bar]));
        }

        for agg in &config.aggregations {
            for binning in config.implemented_binning() {
                specs.push(bin_aggregate(q, *agg, binning));
            }
        }
    }
    specs
}

fn single_c(buckets: &FieldBuckets<'_>, _config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    buckets
        .c
        .iter()
        .map(|c| value_count(c, vec![VT::Tree, VT::Pie, VT::Bar]))
        .collect()
}

fn single_t(buckets: &FieldBuckets<'_>, config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    let mut specs = Vec::new();
    for &t in &buckets.t {
        for binning in config.implemented_binning() {
            specs.push(bin_aggregate(t, Aggregation::Count, binning));
        }
    }
    specs
}

fn value_count(field: &FieldProperties, viz_types: Vec<VT>) -> VisualizationSpec {
    VisualizationSpec {
        generating_procedure: GP::ValueCount,
        type_structure: TS::CQ,
        viz_types,
        field_ids: vec![field.index],
        args: json!({ "field_a": field_ref(field) }),
        meta: SpecMeta::from_terms(vec![
            Term::operation("count"),
            Term::plain("of"),
            Term::field(&field.name),
        ])
        .with_labels(&field.name, "Count"),
    }
}

fn bin_aggregate(field: &FieldProperties, agg: Aggregation, binning: &str) -> VisualizationSpec {
    VisualizationSpec {
        generating_procedure: GP::BinAggregate,
        type_structure: TS::BQ,
        viz_types: vec![VT::Hist],
        field_ids: vec![field.index],
        args: json!({
            "agg_fn": agg.as_str(),
            "agg_field_a": field_ref(field),
            "binning_field": field_ref(field),
            "binning_procedure": binning,
        }),
        meta: SpecMeta::from_terms(vec![
            Term::operation(agg.as_str()),
            Term::plain("of"),
            Term::field(&field.name),
            Term::transformation("by bin"),
        ])
        .with_labels(format!("{} by bin", field.name), format!("{} by bin", agg.label())),
    }
}

// =============================================================================
// PAIRWISE RULES
// =============================================================================

fn pair_cc(buckets: &FieldBuckets<'_>, _config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    pairs(&buckets.grouping_c())
        .map(|(a, b)| VisualizationSpec {
            generating_procedure: GP::MultigroupCount,
            type_structure: TS::ListCQ,
            viz_types: vec![VT::StackedBar],
            field_ids: vec![a.index, b.index],
            args: json!({ "field_a": field_ref(a), "field_b": field_ref(b) }),
            meta: SpecMeta::from_terms(vec![
                Term::operation("count"),
                Term::plain("by"),
                Term::field(&a.name),
                Term::plain("then"),
                Term::field(&b.name),
            ])
            .with_labels(format!("Grouping by {} then {}", a.name, b.name), "Count"),
        })
        .collect()
}

fn pair_qq(buckets: &FieldBuckets<'_>, _config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    pairs(&buckets.q)
        .map(|(a, b)| VisualizationSpec {
            generating_procedure: GP::ValueValue,
            type_structure: TS::QQ,
            viz_types: vec![VT::Scatter],
            field_ids: vec![a.index, b.index],
            args: json!({ "field_a": field_ref(a), "field_b": field_ref(b) }),
            meta: SpecMeta::from_terms(vec![Term::field(&a.name), Term::plain("vs."), Term::field(&b.name)])
                .with_labels(&a.name, &b.name),
        })
        .collect()
}

fn pair_cq(buckets: &FieldBuckets<'_>, config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    let mut specs = Vec::new();
    for &c in &buckets.c {
        for &q in &buckets.q {
            if c.is_unique {
                specs.push(raw_comparison(c, q, TS::CQ, vec![VT::Bar]));
            } else {
                for agg in &config.aggregations {
                    specs.push(group_aggregate(c, q, *agg, TS::CQ, vec![VT::Bar, VT::Pie]));
                }
            }
        }
    }
    specs
}

fn pair_tq(buckets: &FieldBuckets<'_>, config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    let mut specs = Vec::new();
    for &t in &buckets.t {
        for &q in &buckets.q {
            if t.is_unique {
                specs.push(raw_comparison(t, q, TS::TQ, vec![VT::Line, VT::Scatter]));
            } else {
                for agg in &config.aggregations {
                    specs.push(group_aggregate(t, q, *agg, TS::TQ, vec![VT::Line, VT::Bar]));
                }
            }
        }
    }
    specs
}

fn raw_comparison(a: &FieldProperties, q: &FieldProperties, ts: TS, viz_types: Vec<VT>) -> VisualizationSpec {
    VisualizationSpec {
        generating_procedure: GP::ValueValue,
        type_structure: ts,
        viz_types,
        field_ids: vec![a.index, q.index],
        args: json!({ "field_a": field_ref(a), "field_b": field_ref(q) }),
        meta: SpecMeta::from_terms(vec![
            Term::field(&a.name),
            Term::plain("values vs."),
            Term::field(&q.name),
            Term::plain("values"),
        ])
        .with_labels(&a.name, &q.name),
    }
}

fn group_aggregate(
    group: &FieldProperties,
    q: &FieldProperties,
    agg: Aggregation,
    ts: TS,
    viz_types: Vec<VT>,
) -> VisualizationSpec {
    VisualizationSpec {
        generating_procedure: GP::ValueAggregate,
        type_structure: ts,
        viz_types,
        field_ids: vec![group.index, q.index],
        args: json!({
            "agg_fn": agg.as_str(),
            "grouped_field": field_ref(group),
            "agg_field": field_ref(q),
        }),
        meta: SpecMeta::from_terms(vec![
            Term::operation("group"),
            Term::field(&group.name),
            Term::plain("and"),
            Term::operation("aggregate"),
            Term::field(&q.name),
            Term::plain("by"),
            Term::operation(agg.as_str()),
        ])
        .with_labels(&group.name, format!("{} of {}", agg.label(), q.name)),
    }
}

// =============================================================================
// MULTI-FIELD RULES
// =============================================================================
// All gated on non-unique groupings so identifier-like columns do not explode
// the combinations.

fn multi_c(buckets: &FieldBuckets<'_>, _config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    let grouping = buckets.grouping_c();
    if grouping.len() < 3 {
        return Vec::new();
    }

    let mut construction = vec![Term::operation("count"), Term::plain("by")];
    for (i, c) in grouping.iter().enumerate() {
        if i > 0 {
            construction.push(Term::plain("then"));
        }
        construction.push(Term::field(&c.name));
    }

    let names: Vec<&str> = grouping.iter().map(|f| f.name.as_str()).collect();
    vec![VisualizationSpec {
        generating_procedure: GP::MultigroupCount,
        type_structure: TS::ListCQ,
        viz_types: vec![VT::StackedBar, VT::Tree],
        field_ids: grouping.iter().map(|f| f.index).collect(),
        args: json!({ "fields": grouping.iter().map(|f| field_ref(f)).collect::<Vec<_>>() }),
        meta: SpecMeta::from_terms(construction)
            .with_labels(format!("Grouping by {}", names.join(" then ")), "Count"),
    }]
}

fn multi_cq(buckets: &FieldBuckets<'_>, config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    let mut specs = Vec::new();
    for c in buckets.grouping_c() {
        for (qa, qb) in pairs(&buckets.q) {
            for agg in &config.aggregations {
                specs.push(VisualizationSpec {
                    generating_procedure: GP::AggregateAggregate,
                    type_structure: TS::QQ,
                    viz_types: vec![VT::Scatter],
                    field_ids: vec![c.index, qa.index, qb.index],
                    args: json!({
                        "agg_fn": agg.as_str(),
                        "agg_field_a": field_ref(qa),
                        "agg_field_b": field_ref(qb),
                        "grouped_field": field_ref(c),
                    }),
                    meta: SpecMeta::from_terms(vec![
                        Term::operation("group by"),
                        Term::field(&c.name),
                        Term::plain("and"),
                        Term::operation("aggregate"),
                        Term::field(&qa.name),
                        Term::plain("and"),
                        Term::field(&qb.name),
                        Term::plain("by"),
                        Term::operation(agg.as_str()),
                    ])
                    .with_labels(
                        format!("{} of {}", agg.label(), qa.name),
                        format!("{} of {}", agg.label(), qb.name),
                    ),
                });
            }
        }
    }
    specs
}

fn connect(buckets: &FieldBuckets<'_>, _config: &GeneratorConfig) -> Vec<VisualizationSpec> {
    if buckets.q.is_empty() {
        return Vec::new();
    }
    let q_names: Vec<&str> = buckets.q.iter().map(|f| f.name.as_str()).collect();
    let attribute_label = if q_names.len() == 1 { "with attribute" } else { "with attributes" };

    pairs(&buckets.grouping_c())
        .map(|(a, b)| {
            let mut construction = vec![
                Term::plain("connect"),
                Term::field(&a.name),
                Term::plain("and"),
                Term::field(&b.name),
                Term::plain(attribute_label),
            ];
            construction.extend(q_names.iter().map(|n| Term::field(*n)));

            let mut field_ids = vec![a.index, b.index];
            field_ids.extend(buckets.q.iter().map(|f| f.index));

            VisualizationSpec {
                generating_procedure: GP::ValueValueQuantity,
                type_structure: TS::ListCQ,
                viz_types: vec![VT::Network],
                field_ids,
                args: json!({
                    "field_a": field_ref(a),
                    "field_b": field_ref(b),
                    "data_fields": buckets.q.iter().map(|f| field_ref(f)).collect::<Vec<_>>(),
                }),
                meta: SpecMeta::from_terms(construction),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    #[test]
    fn test_pairs() {
        let items = [1, 2, 3];
        let got: Vec<_> = pairs(&items).collect();
        assert_eq!(got, vec![(1, 2), (1, 3), (2, 3)]);
        assert_eq!(pairs(&[1]).count(), 0);
    }

    #[test]
    fn test_buckets_sorted_by_index() {
        let fields = vec![
            FieldProperties::with_type(2, "b", FieldType::String),
            FieldProperties::with_type(0, "a", FieldType::String),
            FieldProperties::with_type(1, "n", FieldType::Integer),
            FieldProperties::with_type(3, "y", FieldType::Year),
        ];
        let buckets = FieldBuckets::new(&fields);
        let c: Vec<_> = buckets.c.iter().map(|f| f.index).collect();
        assert_eq!(c, vec![0, 2]);
        assert_eq!(buckets.q.len(), 1);
        assert_eq!(buckets.t.len(), 1);
    }

    #[test]
    fn test_rule_table_order_and_subset() {
        let table = RuleTable::standard();
        assert_eq!(table.names()[..3], ["single_q", "single_c", "single_t"]);
        assert!(table.rules().windows(2).all(|w| w[0].arity <= w[1].arity));

        let subset = RuleTable::only(&["connect", "single_c"]);
        assert_eq!(subset.names(), vec!["single_c", "connect"]);
    }

    #[test]
    fn test_connect_requires_quantities() {
        let fields = vec![
            FieldProperties::with_type(0, "a", FieldType::String),
            FieldProperties::with_type(1, "b", FieldType::String),
        ];
        let buckets = FieldBuckets::new(&fields);
        assert!(connect(&buckets, &GeneratorConfig::default()).is_empty());

        let mut fields = fields;
        fields.push(FieldProperties::with_type(2, "w", FieldType::Decimal));
        let buckets = FieldBuckets::new(&fields);
        let specs = connect(&buckets, &GeneratorConfig::default());
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].field_ids, vec![0, 1, 2]);
        assert_eq!(specs[0].meta.desc, "connect a and b with attribute w");
    }
}
