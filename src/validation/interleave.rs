//! The interleave phase: grounding rules from endpoint bindings and
//! forward-classifying atoms immediately (`spec.md` §4.4).

use std::collections::HashSet;

use crate::endpoint::Endpoint;
use crate::err::Result;
use crate::model::atom::{Atom, RulePattern};
use crate::model::query::Query;
use crate::model::shape::{Schema, ShapeId};
use crate::validation::state::{RuleBody, ValidationState};

/// Bindings drawn from a filtering neighbour's valid-target set are
/// partitioned into chunks of at most this many instances.
const FILTER_CHUNK_SIZE: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AtomStatus {
    True,
    False,
    Pending,
}

fn classify_atom(state: &ValidationState, atom: &Atom) -> AtomStatus {
    if !state.is_evaluated(&atom.predicate) {
        return AtomStatus::Pending;
    }
    let Some(&owner) = state.preds_to_shapes.get(&atom.predicate) else {
        return AtomStatus::Pending;
    };
    let Some(shape_state) = state.shape_state_ref(owner) else {
        return AtomStatus::Pending;
    };
    if shape_state.inferred.contains(atom) {
        AtomStatus::True
    } else if shape_state.inferred.contains(&atom.negate()) {
        AtomStatus::False
    } else {
        AtomStatus::Pending
    }
}

pub(crate) fn classify_body(state: &ValidationState, body: &[Atom]) -> AtomStatus {
    let mut all_true = true;
    for atom in body {
        match classify_atom(state, atom) {
            AtomStatus::False => return AtomStatus::False,
            AtomStatus::Pending => all_true = false,
            AtomStatus::True => {}
        }
    }
    if all_true {
        AtomStatus::True
    } else {
        AtomStatus::Pending
    }
}

/// Grounds `shape_rule` at focus value `x` directly (its body references
/// query ids, already bound to `x`) and classifies it the same way as a
/// query-rule binding — the "case-1 short-circuit" of `spec.md` §4.4.
fn try_classify_shape_rule(state: &mut ValidationState, shape_id: ShapeId, shape_rule: &RulePattern, x: &str) {
    let head = Atom::new(shape_rule.head.predicate.clone(), x, true);
    let body: Vec<Atom> = shape_rule
        .body
        .iter()
        .map(|pattern| Atom::new(pattern.predicate.clone(), x, pattern.polarity))
        .collect();

    match classify_body(state, &body) {
        AtomStatus::True => {
            state.shape_state(shape_id).inferred.insert(head);
            if state.is_remaining_target(shape_id, x) {
                state.register_target(shape_id, x, true);
            }
            // Memory reclamation: the body atoms are no longer needed once
            // the shape itself is classified.
            let shape_state = state.shape_state(shape_id);
            for atom in &body {
                shape_state.inferred.remove(atom);
            }
        }
        AtomStatus::False => {
            state.shape_state(shape_id).inferred.insert(head.negate());
            if state.is_remaining_target(shape_id, x) {
                state.register_target(shape_id, x, false);
            }
        }
        AtomStatus::Pending => {
            state.add_rule(head, RuleBody::new(body));
        }
    }
}

/// Runs one constraint query's grounding step: rewrites its filter-clause
/// slot from the filtering neighbour's valid targets (partitioned into
/// chunks of at most 80 instances), submits it, and forward-classifies
/// every returned binding.
pub fn interleave_query(
    schema: &Schema,
    endpoint: &Endpoint,
    state: &mut ValidationState,
    shape_id: ShapeId,
    query: &Query,
    shape_rule: &RulePattern,
) -> Result<()> {
    state.register_predicate(query.id.clone(), shape_id);

    let filter_var = query.inter_shape_refs.keys().next().cloned();
    let neighbour = query.inter_shape_refs.values().next().copied();

    let partitions: Vec<Vec<String>> = match neighbour {
        Some(neighbour) => {
            let instances: Vec<String> = schema.get(neighbour).targets.valid.iter().cloned().collect();
            if instances.is_empty() {
                vec![Vec::new()]
            } else {
                instances.chunks(FILTER_CHUNK_SIZE).map(|c| c.to_vec()).collect()
            }
        }
        None => vec![Vec::new()],
    };

    for partition in partitions {
        let sparql = match &filter_var {
            Some(var) => query.with_values_filter(var, &partition),
            None => query.with_values_filter("__unused", &[]),
        };
        // Splicing the neighbour's class IRI as an extra typing triple is an
        // optional narrowing; `with_type_triple` blanks the slot (a
        // correctness-safe superset) whenever the neighbour has no class
        // target to assert.
        let class_iri = neighbour
            .map(|n| schema.get(n))
            .and_then(|shape| shape.target_type.class_iri(shape.target_def.as_deref()));
        let sparql = query.with_type_triple(&sparql, filter_var.as_deref().unwrap_or("__unused"), class_iri.as_deref());

        for binding in endpoint.run_query(sparql)? {
            let Some(x) = binding.get("x").cloned() else {
                continue; // malformed row, skip (spec.md §4.6)
            };
            let Some(head) = query.rule_pattern.head.ground(&binding) else {
                continue;
            };

            let mut body = Vec::with_capacity(query.rule_pattern.body.len());
            let mut fully_bound = true;
            for pattern in &query.rule_pattern.body {
                match pattern.ground(&binding) {
                    Some(atom) => body.push(atom),
                    None => {
                        fully_bound = false;
                        break;
                    }
                }
            }
            if !fully_bound {
                continue;
            }

            match classify_body(state, &body) {
                AtomStatus::True => {
                    state.shape_state(shape_id).inferred.insert(head);
                    try_classify_shape_rule(state, shape_id, shape_rule, &x);
                }
                AtomStatus::False => {
                    // A single row failing its own body does not, by itself,
                    // settle the focus node's shape-level verdict — only the
                    // shape's own rule pattern (`try_classify_shape_rule`) is
                    // allowed to do that, matching `Validation.py`'s split
                    // between its query-rule-body loop (discards a
                    // non-matching grounding) and its separate shape-rule-body
                    // loop (the only place that registers a violation). The
                    // fixpoint in `saturate` still resolves this head to
                    // false once no other grounding of it remains possible.
                    state.shape_state(shape_id).inferred.insert(head.negate());
                }
                AtomStatus::Pending => {
                    state.add_rule(head, RuleBody::new(body));
                }
            }
        }
    }

    Ok(())
}

/// After the min query, synthesizes a defensive rule for every target of
/// `shape_id` that is still unclassified, so saturation can later discover
/// its classification even if no query binding ever touched it directly.
pub fn synthesize_defensive_rules(
    state: &mut ValidationState,
    shape_id: ShapeId,
    shape_rule: &RulePattern,
    pending_targets: &HashSet<String>,
) {
    for target in pending_targets {
        if !state.is_remaining_target(shape_id, target) {
            continue;
        }
        let head = Atom::new(shape_rule.head.predicate.clone(), target.clone(), true);
        if state.rule_map.contains_key(&head) {
            continue;
        }
        let body: Vec<Atom> = shape_rule
            .body
            .iter()
            .map(|pattern| Atom::new(pattern.predicate.clone(), target.clone(), pattern.polarity))
            .collect();
        if body.is_empty() {
            continue;
        }
        state.add_rule(head, RuleBody::new(body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::AtomPattern;

    #[test]
    fn classify_body_is_true_when_every_atom_is_inferred() {
        let mut state = ValidationState::new();
        let shape = crate::model::shape::ShapeId(1);
        state.register_predicate("shape_1", shape);
        state
            .shape_state(shape)
            .inferred
            .insert(Atom::new("shape_1", "ex:b1", true));

        let body = vec![Atom::new("shape_1", "ex:b1", true)];
        assert_eq!(classify_body(&state, &body), AtomStatus::True);
    }

    #[test]
    fn classify_body_is_pending_when_predicate_unevaluated() {
        let state = ValidationState::new();
        let body = vec![Atom::new("shape_1", "ex:b1", true)];
        assert_eq!(classify_body(&state, &body), AtomStatus::Pending);
    }

    #[test]
    fn shape_rule_pattern_head_groundable() {
        let pattern = AtomPattern::new("shape_0", "x", true);
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("x".to_string(), "ex:a1".to_string());
        assert_eq!(pattern.ground(&bindings).unwrap().individual, "ex:a1");
    }
}
