//! The saturate phase: closure under negation and modus ponens over pending
//! rules (`spec.md` §4.5), grounded in `Validation.py`'s
//! `saturate_remaining`/`negate_unmatchable_heads`/`apply_rules`.

use std::collections::HashSet;

use crate::model::atom::Atom;
use crate::model::shape::ShapeId;
use crate::validation::interleave::{classify_body, AtomStatus};
use crate::validation::state::ValidationState;

/// Runs `negate_unmatchable_heads` and `apply_rules` in a loop until a full
/// pass changes neither the inferred sets nor the rule map. Terminates
/// because the atom domain is finite and updates are monotone (`spec.md`
/// §4.5).
pub fn saturate(state: &mut ValidationState) {
    loop {
        let negated = negate_unmatchable_heads(state);
        let applied = apply_rules(state);
        if !negated && !applied {
            break;
        }
    }
}

fn mark_inferred(state: &mut ValidationState, atom: Atom, owner: Option<ShapeId>) {
    let Some(owner) = owner else { return };
    state.shape_state(owner).inferred.insert(atom.clone());
    // Only a `shape_N` atom IS a target's own classification; a constraint
    // sub-atom (e.g. `A_max_0`) merely shares the same individual and owner
    // and must never register a verdict on its behalf (`is_remaining_target`
    // keys on individual alone, so it would otherwise match here too).
    if atom.predicate == format!("shape_{}", owner.0) && state.is_remaining_target(owner, &atom.individual) {
        state.register_target(owner, &atom.individual, atom.polarity);
    }
}

/// For every atom appearing in a pending rule body, or that is still a
/// remaining target: if its predicate has been evaluated, it has no
/// pending rule with itself as head, and it isn't already inferred, the
/// false-polarity version of the atom is added to its owning shape's
/// `inferred` — not the atom's own negation. A max-constraint body atom
/// is already written with polarity `false` ("not violated"); the
/// unmatched default must confirm that same literal, not flip it.
fn negate_unmatchable_heads(state: &mut ValidationState) -> bool {
    let mut changed = false;

    let mut candidates: HashSet<Atom> = HashSet::new();
    for bodies in state.rule_map.values() {
        for body in bodies {
            candidates.extend(body.0.iter().cloned());
        }
    }
    candidates.extend(state.remaining_targets.iter().cloned());

    for atom in candidates {
        if !state.is_evaluated(&atom.predicate) {
            continue;
        }
        if state.rule_map.contains_key(&atom) {
            continue;
        }
        let Some(owner) = state.preds_to_shapes.get(&atom.predicate).copied() else {
            continue;
        };
        if state.shape_state(owner).inferred.contains(&atom) {
            continue;
        }
        let defaulted = Atom::new(atom.predicate.clone(), atom.individual.clone(), false);
        if state.shape_state(owner).inferred.contains(&defaulted) {
            continue;
        }
        mark_inferred(state, defaulted, Some(owner));
        changed = true;
    }

    changed
}

/// Scans pending rules: a body is `T` if every atom is inferred true, `F`
/// if any atom's negation is inferred, otherwise `P`. A head with any `T`
/// body is inferred; a head with every body `F` is negated; otherwise it is
/// left pending.
fn apply_rules(state: &mut ValidationState) -> bool {
    let mut changed = false;
    let heads: Vec<Atom> = state.rule_map.keys().cloned().collect();

    for head in heads {
        let Some(bodies) = state.rule_map.get(&head).cloned() else {
            continue;
        };
        if bodies.is_empty() {
            continue;
        }

        let mut any_true = false;
        let mut all_false = true;
        for body in &bodies {
            match classify_body(state, &body.0) {
                AtomStatus::True => any_true = true,
                AtomStatus::False => {}
                AtomStatus::Pending => all_false = false,
            }
            if any_true {
                break;
            }
        }

        if any_true {
            let owner = state.preds_to_shapes.get(&head.predicate).copied();
            mark_inferred(state, head.clone(), owner);
            state.drop_rules(&head);
            changed = true;
        } else if all_false {
            let owner = state.preds_to_shapes.get(&head.predicate).copied();
            mark_inferred(state, head.negate(), owner);
            state.drop_rules(&head);
            changed = true;
        }
    }

    changed
}
