//! `ValidationState` and per-shape `ShapeState` bookkeeping (`spec.md` §3),
//! grounded in `original_source/TravSHACL/rule_based_validation/
//! Validation.py`'s `ValidationState` class.

use std::collections::{HashMap, HashSet};

use crate::model::atom::Atom;
use crate::model::shape::{ShapeId, TargetSets};

/// A grounded rule body: the set of atoms that must all hold for the rule's
/// head to be inferred. Stored as a sorted `Vec` so it can be hashed and
/// deduplicated inside the outer disjunction set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleBody(pub Vec<Atom>);

impl RuleBody {
    pub fn new(mut atoms: Vec<Atom>) -> Self {
        atoms.sort_by(|a, b| (&a.predicate, &a.individual, a.polarity).cmp(&(&b.predicate, &b.individual, b.polarity)));
        atoms.dedup();
        RuleBody(atoms)
    }
}

#[derive(Debug, Default)]
pub struct ShapeState {
    /// The already-visited neighbour used to filter this shape's target
    /// retrieval, once picked.
    pub filtering_shape: Option<ShapeId>,
    /// Atoms decisively classified for this shape, both positive and
    /// negated.
    pub inferred: HashSet<Atom>,
    pub remaining_targets_count: usize,
    pub registered_targets: TargetSets,
}

#[derive(Debug, Default)]
pub struct ValidationState {
    pub remaining_targets: HashSet<Atom>,
    pub visited_shapes: HashSet<ShapeId>,
    pub evaluated_predicates: HashSet<String>,
    pub preds_to_shapes: HashMap<String, ShapeId>,
    pub rule_map: HashMap<Atom, HashSet<RuleBody>>,
    pub rule_number: usize,
    pub total_rule_number: usize,
    shapes: HashMap<ShapeId, ShapeState>,
}

impl ValidationState {
    pub fn new() -> Self {
        ValidationState::default()
    }

    pub fn shape_state(&mut self, shape_id: ShapeId) -> &mut ShapeState {
        self.shapes.entry(shape_id).or_default()
    }

    pub fn shape_state_ref(&self, shape_id: ShapeId) -> Option<&ShapeState> {
        self.shapes.get(&shape_id)
    }

    pub fn register_predicate(&mut self, predicate: impl Into<String>, owner: ShapeId) {
        let predicate = predicate.into();
        self.preds_to_shapes.insert(predicate.clone(), owner);
        self.evaluated_predicates.insert(predicate);
    }

    pub fn is_evaluated(&self, predicate: &str) -> bool {
        self.evaluated_predicates.contains(predicate)
    }

    /// Adds a pending grounded rule. Returns `true` if this exact body was
    /// not already recorded for `head` (used to keep `rule_number` accurate).
    pub fn add_rule(&mut self, head: Atom, body: RuleBody) -> bool {
        let bodies = self.rule_map.entry(head).or_default();
        let inserted = bodies.insert(body);
        if inserted {
            self.rule_number += 1;
            self.total_rule_number += 1;
        }
        inserted
    }

    /// Removes every pending rule for `head` once it has been classified.
    pub fn drop_rules(&mut self, head: &Atom) {
        if let Some(bodies) = self.rule_map.remove(head) {
            self.rule_number = self.rule_number.saturating_sub(bodies.len());
        }
    }

    /// Registers a target as valid or violated against both the owning
    /// shape's bookkeeping and the global `remaining_targets` set.
    pub fn register_target(&mut self, shape_id: ShapeId, target: &str, valid: bool) {
        let state = self.shape_state(shape_id);
        if valid {
            state.registered_targets.register_valid(target);
        } else {
            state.registered_targets.register_violated(target);
        }
        state.remaining_targets_count = state.remaining_targets_count.saturating_sub(1);

        self.remaining_targets
            .retain(|atom| !(atom.predicate == format!("shape_{}", shape_id.0) && atom.individual == target));
    }

    pub fn is_remaining_target(&self, shape_id: ShapeId, target: &str) -> bool {
        self.remaining_targets
            .iter()
            .any(|atom| atom.predicate == format!("shape_{}", shape_id.0) && atom.individual == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_target_removes_from_remaining_and_records_classification() {
        let mut state = ValidationState::new();
        let shape = ShapeId(0);
        state
            .remaining_targets
            .insert(Atom::new("shape_0", "ex:a1", true));
        state.register_target(shape, "ex:a1", true);
        assert!(!state.is_remaining_target(shape, "ex:a1"));
        assert!(state.shape_state_ref(shape).unwrap().registered_targets.valid.contains("ex:a1"));
    }

    #[test]
    fn add_rule_increments_counts_once_per_distinct_body() {
        let mut state = ValidationState::new();
        let head = Atom::new("A_pos", "ex:a1", true);
        let body = RuleBody::new(vec![Atom::new("shape_1", "ex:b1", true)]);
        assert!(state.add_rule(head.clone(), body.clone()));
        assert!(!state.add_rule(head.clone(), body));
        assert_eq!(state.rule_number, 1);
        assert_eq!(state.total_rule_number, 1);
    }
}
