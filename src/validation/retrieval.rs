//! Target retrieval with neighbour-based filtering (`spec.md` §4.3).

use std::collections::{HashMap, HashSet};

use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::model::atom::Atom;
use crate::model::constraint::Constraint;
use crate::model::query::Query;
use crate::model::shape::{Schema, ShapeId};
use crate::planner::QueryPlanner;
use crate::validation::state::ValidationState;

/// Endpoint round-trips are partitioned so no single `VALUES` clause holds
/// more than this many IRIs (`spec.md` §4.3/§8, invariant 8).
pub const MAX_INSTANCES_PER_PARTITION: usize = 115;

/// Picks the best already-visited neighbour to filter `shape_id`'s target
/// retrieval: a nonzero count of invalid targets, both counts under
/// `threshold`, and a target query of its own.
pub fn best_filtering_neighbour(
    schema: &Schema,
    state: &ValidationState,
    shape_id: ShapeId,
    threshold: usize,
) -> Option<ShapeId> {
    let shape = schema.get(shape_id);
    let mut candidates: Vec<ShapeId> = shape
        .referenced_shapes
        .keys()
        .copied()
        .filter(|neighbour| state.visited_shapes.contains(neighbour))
        .filter(|&neighbour| {
            let neighbour_shape = schema.get(neighbour);
            neighbour_shape.has_target_selector()
                && !neighbour_shape.targets.violated.is_empty()
                && neighbour_shape.targets.valid.len() < threshold
                && neighbour_shape.targets.violated.len() < threshold
        })
        .collect();
    candidates.sort_by_key(|id| id.0);
    candidates.into_iter().next()
}

/// The outcome of target retrieval for one shape: targets already classified
/// during retrieval (before interleave even runs) and targets still pending
/// classification.
pub struct RetrievalOutcome {
    pub pending: HashSet<String>,
}

/// Registers `target` as violated and records the shape's own negation atom,
/// so later saturate/interleave passes that look at `shape_{id}(target)`
/// see it as already settled rather than re-deriving it from a pending rule.
fn negate_target(state: &mut ValidationState, shape_id: ShapeId, target: &str) {
    state.register_target(shape_id, target, false);
    state
        .shape_state(shape_id)
        .inferred
        .insert(Atom::new(format!("shape_{}", shape_id.0), target, false));
}

/// Implements the `--selective` neighbour-based filtering (`spec.md` §4.3
/// steps 1-2): for every constraint of `shape_id` referencing an
/// already-visited neighbour, counts how many of the neighbour's known-valid
/// targets each candidate references, and settles the min/max violations
/// that the count alone already decides — before interleave ever runs a
/// single constraint query for that candidate.
fn filter_by_neighbour(
    schema: &Schema,
    endpoint: &Endpoint,
    state: &mut ValidationState,
    shape_id: ShapeId,
    pending: &mut HashSet<String>,
    threshold: usize,
) -> Result<()> {
    let Some(neighbour) = best_filtering_neighbour(schema, state, shape_id, threshold) else {
        return Ok(());
    };
    let neighbour_name = schema.get(neighbour).name.clone();
    let valid_instances: Vec<String> = schema.get(neighbour).targets.valid.iter().cloned().collect();
    if valid_instances.is_empty() {
        return Ok(());
    }

    for constraint in schema
        .get(shape_id)
        .constraints
        .iter()
        .filter(|c| c.base().shape_ref == Some(neighbour))
    {
        let min = constraint.min();
        let max = constraint.max();
        if min.is_none() && max.is_none() {
            continue;
        }

        let Some(query) = QueryPlanner::filtered_target_query(schema.get(shape_id), neighbour, &neighbour_name, true)
        else {
            continue;
        };

        let mut counts: HashMap<String, i64> = HashMap::new();
        for chunk in valid_instances.chunks(MAX_INSTANCES_PER_PARTITION) {
            let sparql = query.with_values_filter("inst", chunk);
            for binding in endpoint.run_query(sparql)? {
                let (Some(x), Some(cnt)) = (binding.get("x"), binding.get("cnt")) else {
                    continue;
                };
                let cnt: i64 = cnt.parse().unwrap_or(0);
                *counts.entry(x.clone()).or_insert(0) += cnt;
            }
        }

        for target in pending.iter().cloned().collect::<Vec<_>>() {
            let count = counts.get(&target).copied().unwrap_or(0);
            let violated = min.is_some_and(|m| count < m as i64) || max.is_some_and(|m| count > m as i64);
            if violated {
                pending.remove(&target);
                negate_target(state, shape_id, &target);
            }
        }
    }

    Ok(())
}

/// Runs the plain (or filtered) target query, the disjunction query if any,
/// and every `Raw` constraint's ASK-style query, classifying targets
/// directly invalid wherever possible and leaving the rest pending for
/// interleave.
pub fn retrieve_next_targets(
    schema: &Schema,
    endpoint: &Endpoint,
    state: &mut ValidationState,
    shape_id: ShapeId,
    target_query: &Query,
    disjunction_query: Option<&Query>,
    selective: bool,
    threshold: usize,
) -> Result<RetrievalOutcome> {
    let mut pending = HashSet::new();

    let plain_sparql = target_query.with_values_filter("__unused", &[]);
    for binding in endpoint.run_query(plain_sparql)? {
        if let Some(value) = binding.get("x") {
            pending.insert(value.clone());
        }
    }

    let predicate = format!("shape_{}", shape_id.0);
    for target in &pending {
        state
            .remaining_targets
            .insert(Atom::new(predicate.clone(), target.clone(), true));
    }

    if selective {
        filter_by_neighbour(schema, endpoint, state, shape_id, &mut pending, threshold)?;
    }

    if let Some(disjunction) = disjunction_query {
        let mut satisfied = HashSet::new();
        for binding in endpoint.run_query(disjunction.sparql.clone())? {
            if let Some(value) = binding.get("x") {
                satisfied.insert(value.clone());
            }
        }
        for target in pending.iter().cloned().collect::<Vec<_>>() {
            if !satisfied.contains(&target) {
                pending.remove(&target);
                negate_target(state, shape_id, &target);
            }
        }
    }

    let raw_constraints: Vec<&Constraint> = schema
        .get(shape_id)
        .constraints
        .iter()
        .filter(|c| matches!(c, Constraint::Raw { .. }))
        .collect();
    for constraint in raw_constraints {
        if let Constraint::Raw { query, .. } = constraint {
            for target in pending.iter().cloned().collect::<Vec<_>>() {
                let ask = query.replace("$this", &format!("<{}>", target));
                let mut rows = endpoint.run_query(ask)?;
                if rows.next().is_some() {
                    pending.remove(&target);
                    negate_target(state, shape_id, &target);
                }
            }
        }
    }

    state.shape_state(shape_id).remaining_targets_count = pending.len();

    Ok(RetrievalOutcome { pending })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::path::Path;
    use crate::model::shape::Schema;

    #[test]
    fn best_filtering_neighbour_requires_visited_and_below_threshold() {
        let mut schema = Schema::new();
        let a = schema.insert("A");
        let b = schema.insert("B");
        schema.get_mut(a).referenced_shapes.insert(b, Path::forward("p"));
        schema.get_mut(b).target_def = Some("?x a :B .".to_string());
        schema.get_mut(b).targets.register_violated("ex:b1");

        let mut state = ValidationState::new();
        assert!(best_filtering_neighbour(&schema, &state, a, 256).is_none());

        state.visited_shapes.insert(b);
        assert_eq!(best_filtering_neighbour(&schema, &state, a, 256), Some(b));
    }
}
