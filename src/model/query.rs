//! Materialized queries: a SPARQL-syntax string plus the rule pattern it
//! grounds.

use std::collections::HashMap;

use crate::model::atom::RulePattern;
use crate::model::shape::ShapeId;

/// Placeholders the QueryPlanner leaves in generated query text for the
/// ValidationEngine to splice at run time (`spec.md` §4.1, bit-exact).
pub const FILTER_CLAUSE_SLOT: &str = "$filter_clause_to_add$";
pub const INTER_SHAPE_TYPE_SLOT: &str = "$inter_shape_type_to_add$";
pub const INSTANCES_SLOT: &str = "$instances_to_add$";

#[derive(Debug, Clone)]
pub struct Query {
    /// `<shape_id>_pos`, `<shape_id>_max_{k}`, or a synthetic target-query id.
    pub id: String,
    pub rule_pattern: RulePattern,
    pub sparql: String,
    /// Variables bound to an inter-shape-reference individual, mapped to
    /// the shape they must resolve to.
    pub inter_shape_refs: HashMap<String, ShapeId>,
    /// Forces the negated-reference rewrite (a `max == 0` reference).
    pub max_zero: bool,
}

impl Query {
    pub fn new(id: impl Into<String>, rule_pattern: RulePattern, sparql: impl Into<String>) -> Self {
        Query {
            id: id.into(),
            rule_pattern,
            sparql: sparql.into(),
            inter_shape_refs: HashMap::new(),
            max_zero: false,
        }
    }

    /// Splices a `VALUES ?var { ... }` block into the filter-clause slot.
    pub fn with_values_filter(&self, var: &str, instances: &[String]) -> String {
        if instances.is_empty() {
            return self.sparql.replace(FILTER_CLAUSE_SLOT, "");
        }
        let list = instances
            .iter()
            .map(|i| format!("<{}>", i))
            .collect::<Vec<_>>()
            .join(" ");
        self.sparql
            .replace(FILTER_CLAUSE_SLOT, &format!("VALUES ?{} {{ {} }}", var, list))
    }

    /// Splices a typing triple into the inter-shape-type slot when the
    /// referenced shape has class-typed targets.
    pub fn with_type_triple(&self, sparql: &str, var: &str, class_iri: Option<&str>) -> String {
        match class_iri {
            Some(iri) => sparql.replace(INTER_SHAPE_TYPE_SLOT, &format!("?{} a <{}> .", var, iri)),
            None => sparql.replace(INTER_SHAPE_TYPE_SLOT, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::AtomPattern;

    fn dummy_pattern() -> RulePattern {
        RulePattern::new(AtomPattern::new("q_0", "x", true), vec![])
    }

    #[test]
    fn with_values_filter_splices_values_block() {
        let q = Query::new(
            "A_pos",
            dummy_pattern(),
            format!("SELECT ?x WHERE {{ {} ?x <p> ?v0 . }}", FILTER_CLAUSE_SLOT),
        );
        let rendered = q.with_values_filter("v0", &["ex:a1".to_string(), "ex:a2".to_string()]);
        assert!(rendered.contains("VALUES ?v0 { <ex:a1> <ex:a2> }"));
    }

    #[test]
    fn with_values_filter_blanks_slot_when_no_instances() {
        let q = Query::new(
            "A_pos",
            dummy_pattern(),
            format!("SELECT ?x WHERE {{ {} ?x <p> ?v0 . }}", FILTER_CLAUSE_SLOT),
        );
        let rendered = q.with_values_filter("v0", &[]);
        assert!(!rendered.contains("VALUES"));
    }
}
