//! Parent/child detection between adjacent categorical columns.
//!
//! Column *i* is the parent of column *i+1* when every distinct value of *i*
//! co-occurs with a set of *i+1* values that no other value of *i* shares.
//! Only the first `hierarchy_value_cap` distinct parent values are examined,
//! so the result is an approximation on high-cardinality columns.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

use super::properties::PropertyConfig;
use crate::input::DataTable;
use crate::schema::FieldProperties;

/// Annotate `child` / `is_child` on adjacent column pairs.
///
/// Every column not linked is reset to `child = None` / `is_child = false`.
pub fn detect_hierarchies(fields: &mut [FieldProperties], table: &DataTable, config: &PropertyConfig) {
    for field in fields.iter_mut() {
        field.child = None;
        field.is_child = false;
    }

    for i in 0..fields.len().saturating_sub(1) {
        let (parent, child) = (&fields[i], &fields[i + 1]);
        if parent.is_unique || parent.is_quantitative() || child.is_quantitative() {
            continue;
        }
        if parent.unique_values.len() <= 1 {
            continue;
        }

        if is_injective(table, parent, child, config) {
            let child_name = child.name.clone();
            fields[i].child = Some(child_name);
            fields[i + 1].is_child = true;
        }
    }
}

/// Whether each examined parent value maps to child values no other parent value has.
fn is_injective(
    table: &DataTable,
    parent: &FieldProperties,
    child: &FieldProperties,
    config: &PropertyConfig,
) -> bool {
    if parent.unique_values.len() > config.hierarchy_value_cap {
        debug!(
            parent = %parent.name,
            distinct = parent.unique_values.len(),
            cap = config.hierarchy_value_cap,
            "hierarchy check truncated to capped distinct values"
        );
    }

    let examined: HashSet<&str> = parent
        .unique_values
        .iter()
        .take(config.hierarchy_value_cap)
        .map(String::as_str)
        .collect();

    let mut co_occurring: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
    for row in 0..table.row_count() {
        let (Some(p), Some(c)) = (table.get(row, parent.index), table.get(row, child.index)) else {
            continue;
        };
        if !examined.contains(p) || c == config.hierarchy_unknown_marker {
            continue;
        }
        // Missing children are one shared value, so they can overlap across parents.
        let c = if DataTable::is_null_value(c) { "" } else { c };
        co_occurring.entry(p).or_default().insert(c);
    }

    let mut owner: HashMap<&str, &str> = HashMap::new();
    for (p, children) in &co_occurring {
        for c in children {
            if owner.insert(*c, *p).is_some() {
                return false;
            }
        }
    }
    true
}

/// A root entity with the chain of columns nested beneath it.
#[derive(Debug, Clone, Serialize)]
pub struct EntityTree {
    pub entity: FieldProperties,
    /// Descendants in nesting order, nearest first.
    pub descendants: Vec<FieldProperties>,
}

/// Non-quantitative root entities with their child chains.
///
/// Chains are walked iteratively with a visited set, so a malformed cycle
/// terminates instead of looping.
pub fn entity_trees(fields: &[FieldProperties]) -> Vec<EntityTree> {
    let entities: Vec<&FieldProperties> = fields.iter().filter(|f| !f.is_quantitative()).collect();
    let by_name: HashMap<&str, usize> = entities
        .iter()
        .enumerate()
        .map(|(pos, f)| (f.name.as_str(), pos))
        .collect();
    let adjacency: Vec<Option<usize>> = entities
        .iter()
        .map(|f| f.child.as_deref().and_then(|c| by_name.get(c).copied()))
        .collect();

    entities
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.is_child)
        .map(|(root, f)| {
            let mut visited = HashSet::from([root]);
            let mut descendants = Vec::new();
            let mut next = adjacency[root];
            while let Some(pos) = next {
                if !visited.insert(pos) {
                    break;
                }
                descendants.push(entities[pos].clone());
                next = adjacency[pos];
            }
            EntityTree {
                entity: (*f).clone(),
                descendants,
            }
        })
        .collect()
}

/// The quantitative fields.
pub fn attributes(fields: &[FieldProperties]) -> Vec<&FieldProperties> {
    fields.iter().filter(|f| f.is_quantitative()).collect()
}
