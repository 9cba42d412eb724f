//! Translates a shape's constraints into selective graph queries and the
//! rule patterns their bindings will ground (`spec.md` §4.1).
//!
//! Grounded in `original_source/TravSHACL/sparql/QueryGenerator.py`: target
//! queries, one min query per shape, one max query per upper-bound
//! constraint, and an optional disjunction query.

use crate::model::atom::{AtomPattern, RulePattern};
use crate::model::constraint::Constraint;
use crate::model::query::{Query, FILTER_CLAUSE_SLOT, INTER_SHAPE_TYPE_SLOT};
use crate::model::shape::{Shape, ShapeId, TargetKind};
use crate::planner::VariableGenerator;

pub struct QueryPlanner;

impl QueryPlanner {
    /// The plain target query: `SELECT DISTINCT ?x WHERE { T(x) } [ORDER BY
    /// ?x]`.
    pub fn target_query(shape: &Shape) -> Option<Query> {
        let target_def = shape.target_def.as_ref()?;
        let order_by = if shape.order_by { " ORDER BY ?x" } else { "" };
        let sparql = format!(
            "{prefixes}SELECT DISTINCT ?x WHERE {{ {filter}{target} }}{order_by}",
            prefixes = Self::prefix_string(shape),
            filter = FILTER_CLAUSE_SLOT,
            target = target_def,
            order_by = order_by,
        );
        let head = AtomPattern::new(shape.name.clone(), "x", true);
        Some(Query::new(
            format!("{}_target", shape.name),
            RulePattern::new(head, Vec::new()),
            sparql,
        ))
    }

    /// The filtered-by-valid/-invalid target-query form: counts, per focus
    /// candidate, how many bound reference instances fall into the known
    /// valid (or invalid) set of the filtering neighbour.
    pub fn filtered_target_query(
        shape: &Shape,
        neighbour: ShapeId,
        neighbour_name: &str,
        by_valid: bool,
    ) -> Option<Query> {
        let target_def = shape.target_def.as_ref()?;
        let path = shape.referenced_shapes.get(&neighbour)?;
        let triple = path.triple_pattern("x", "inst");
        let suffix = if by_valid { "valid" } else { "invalid" };
        let sparql = format!(
            "{prefixes}SELECT ?x (COUNT(DISTINCT ?inst) AS ?cnt) WHERE {{ {target} {triple} {filter} }} GROUP BY ?x",
            prefixes = Self::prefix_string(shape),
            target = target_def,
            triple = triple,
            filter = FILTER_CLAUSE_SLOT,
        );
        let head = AtomPattern::new(format!("{}_{}_{}", shape.name, neighbour_name, suffix), "x", true);
        let mut query = Query::new(
            format!("{}_{}_{}", shape.name, neighbour_name, suffix),
            RulePattern::new(head, Vec::new()),
            sparql,
        );
        query.inter_shape_refs.insert("inst".to_string(), neighbour);
        Some(query)
    }

    /// One query per shape, combining the triple patterns of every
    /// lower-bound constraint. Grounding produces a positive atom per
    /// referenced shape for every generated object variable.
    pub fn min_query(shape: &Shape, variables: &mut VariableGenerator) -> Option<Query> {
        let min_constraints: Vec<&Constraint> = shape
            .constraints
            .iter()
            .filter(|c| c.min().is_some())
            .collect();
        if min_constraints.is_empty() {
            return None;
        }

        let mut triples = Vec::new();
        let mut filters = Vec::new();
        let mut body = Vec::new();
        let mut ref_vars = Vec::new();
        for constraint in &min_constraints {
            let min = constraint.min().unwrap();
            let vars = variables.next_n(min);
            for (i, var) in vars.iter().enumerate() {
                triples.push(constraint.base().path.triple_pattern("x", var));
                // Plain triple patterns don't force distinct bindings across
                // `vars` — without this, one matching triple alone would
                // satisfy a min-N constraint for any N.
                for other in &vars[..i] {
                    filters.push(format!("FILTER(?{} != ?{})", var, other));
                }
                if let Some(shape_ref) = constraint.base().shape_ref {
                    body.push(AtomPattern::new(
                        format!("shape_{}", shape_ref.0),
                        var.clone(),
                        !constraint.base().negated,
                    ));
                    ref_vars.push(var.clone());
                }
            }
        }
        triples.extend(filters);

        let id = format!("{}_pos", shape.name);
        // Every var a body atom grounds on must be projected, or `ground()`
        // finds it unbound in every binding row.
        let projected = ref_vars.iter().map(|v| format!("?{}", v)).collect::<Vec<_>>().join(" ");
        let sparql = format!(
            "{prefixes}SELECT DISTINCT ?x {projected} WHERE {{ {target}{filter} {triples} {type_slot} }}",
            prefixes = Self::prefix_string(shape),
            target = shape.target_def.clone().unwrap_or_default(),
            filter = FILTER_CLAUSE_SLOT,
            triples = triples.join(" "),
            type_slot = INTER_SHAPE_TYPE_SLOT,
        );

        let head = AtomPattern::new(id.clone(), "x", true);
        Some(Query::new(id, RulePattern::new(head, body), sparql))
    }

    /// One query per upper-bound constraint. A plain triple pattern with
    /// `HAVING (COUNT(DISTINCT ?v) >= max+1)` when the constraint stands
    /// alone; otherwise the same N-variable existential form `min_query`
    /// uses, with `N = max+1`: a row only grounds when `max+1` *distinct*
    /// references all ground positively against the referenced shape, so a
    /// single grounding is itself the cumulative-overflow witness
    /// (`spec.md` §4.4's `inter_constr_count`, counted per focus node by
    /// construction rather than in a side table). `max == 0` references
    /// splice in the subject-typing slot so the filter is evaluable.
    pub fn max_queries(shape: &Shape, variables: &mut VariableGenerator) -> Vec<Query> {
        shape
            .constraints
            .iter()
            .enumerate()
            .filter_map(|(k, constraint)| {
                let max = constraint.max()?;
                let id = format!("{}_max_{}", shape.name, k);

                let mut query = if constraint.base().shape_ref.is_none() {
                    let var = variables.next_variable();
                    let triple = constraint.base().path.triple_pattern("x", &var);
                    let sparql = format!(
                        "{prefixes}SELECT ?x (COUNT(DISTINCT ?{var}) AS ?cnt) WHERE {{ {target}{filter} {triple} }} GROUP BY ?x HAVING (COUNT(DISTINCT ?{var}) >= {bound})",
                        prefixes = Self::prefix_string(shape),
                        target = shape.target_def.clone().unwrap_or_default(),
                        filter = FILTER_CLAUSE_SLOT,
                        triple = triple,
                        var = var,
                        bound = max + 1,
                    );
                    let head = AtomPattern::new(id.clone(), "x", true);
                    Query::new(id.clone(), RulePattern::new(head, Vec::new()), sparql)
                } else {
                    let shape_ref = constraint.base().shape_ref.unwrap();
                    let vars = variables.next_n(max + 1);

                    let mut triples = Vec::new();
                    let mut filters = Vec::new();
                    let mut body = Vec::new();
                    for (i, var) in vars.iter().enumerate() {
                        triples.push(constraint.base().path.triple_pattern("x", var));
                        for other in &vars[..i] {
                            filters.push(format!("FILTER(?{} != ?{})", var, other));
                        }
                        body.push(AtomPattern::new(format!("shape_{}", shape_ref.0), var.clone(), true));
                    }
                    triples.extend(filters);

                    let projected = vars.iter().map(|v| format!("?{}", v)).collect::<Vec<_>>().join(" ");
                    let sparql = format!(
                        "{prefixes}SELECT DISTINCT ?x {projected} WHERE {{ {target}{filter} {triples} {type_slot} }}",
                        prefixes = Self::prefix_string(shape),
                        target = shape.target_def.clone().unwrap_or_default(),
                        filter = FILTER_CLAUSE_SLOT,
                        triples = triples.join(" "),
                        type_slot = INTER_SHAPE_TYPE_SLOT,
                    );
                    // Overflow is the normal "max" sense now (true = violated),
                    // matching the no-shape_ref branch above: `max+1` distinct
                    // valid references grounding together in one row already
                    // is the overflow witness.
                    let head = AtomPattern::new(id.clone(), "x", true);
                    let mut query = Query::new(id.clone(), RulePattern::new(head, body), sparql);
                    // Only the first variable carries the VALUES/type-triple
                    // optimization; correctness still rests on classifying
                    // every body atom, not on this narrowing.
                    query.inter_shape_refs.insert(vars[0].clone(), shape_ref);
                    query
                };
                query.max_zero = query.max_zero || max == 0;
                Some(query)
            })
            .collect()
    }

    /// Non-empty `options` lists become an outer `SELECT DISTINCT ?x` whose
    /// body is the `UNION` of each option's cardinality sub-pattern.
    pub fn disjunction_query(shape: &Shape, variables: &mut VariableGenerator) -> Option<Query> {
        let disjunctive: Vec<&Constraint> = shape
            .constraints
            .iter()
            .filter(|c| !c.base().options.is_empty())
            .collect();
        if disjunctive.is_empty() {
            return None;
        }

        let target = shape.target_def.clone().unwrap_or_default();
        let mut branches = Vec::new();
        for constraint in &disjunctive {
            for option in &constraint.base().options {
                let count = option.variable_count().max(1);
                let vars = variables.next_n(count);
                let triples: Vec<String> = vars
                    .iter()
                    .map(|v| option.base().path.triple_pattern("x", v))
                    .collect();
                // Plain triples don't force `vars` to bind distinct values; add
                // pairwise inequalities so an N-variable pattern really needs N
                // distinct occurrences (same fix as `min_query`).
                let mut filters = Vec::new();
                for (i, var) in vars.iter().enumerate() {
                    for other in &vars[..i] {
                        filters.push(format!("FILTER(?{} != ?{})", var, other));
                    }
                }
                let mut body = triples;
                body.extend(filters);

                // A max-bounded branch is satisfied by the *absence* of
                // `max+1` distinct occurrences, not their presence.
                let branch = if option.max().is_some() {
                    format!(
                        "{{ SELECT ?x WHERE {{ {target} FILTER NOT EXISTS {{ {body} }} }} }}",
                        target = target,
                        body = body.join(" ")
                    )
                } else {
                    format!(
                        "{{ SELECT ?x WHERE {{ {target} {body} }} GROUP BY ?x }}",
                        target = target,
                        body = body.join(" ")
                    )
                };
                branches.push(branch);
            }
        }

        let id = format!("{}_or", shape.name);
        let sparql = format!(
            "{prefixes}SELECT DISTINCT ?x WHERE {{ {union} }}",
            prefixes = Self::prefix_string(shape),
            union = branches.join(" UNION "),
        );
        let head = AtomPattern::new(id.clone(), "x", true);
        Some(Query::new(id, RulePattern::new(head, Vec::new()), sparql))
    }

    /// The shape-level rule pattern: head = `(shape_id, x, true)`, body =
    /// the min-query atom (positive) plus one negative atom per surviving
    /// max-query.
    pub fn shape_rule_pattern(shape: &Shape, min_query_id: Option<&str>, max_query_ids: &[String]) -> RulePattern {
        let head = AtomPattern::new(format!("shape_{}", shape.id.0), "x", true);
        let mut body = Vec::new();
        if let Some(min_id) = min_query_id {
            body.push(AtomPattern::new(min_id, "x", true));
        }
        for max_id in max_query_ids {
            body.push(AtomPattern::new(max_id.clone(), "x", false));
        }
        RulePattern::new(head, body)
    }

    fn prefix_string(shape: &Shape) -> String {
        if !shape.include_prefixes || shape.prefixes.is_empty() {
            return String::new();
        }
        shape
            .prefixes
            .iter()
            .map(|(prefix, iri)| format!("PREFIX {}: <{}> ", prefix, iri))
            .collect::<Vec<_>>()
            .join("")
    }
}

impl TargetKind {
    pub fn class_iri(&self, target_def: Option<&str>) -> Option<String> {
        match self {
            TargetKind::Class => target_def.map(|s| s.to_string()),
            _ => None,
        }
    }
}
