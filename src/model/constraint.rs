//! Constraint model: a tagged variant over the common fields, replacing the
//! original's class hierarchy (`Constraint` / `MinOnlyConstraint` /
//! `MaxOnlyConstraint` / `MinMaxConstraint` in
//! `original_source/TravSHACL/constraints/`).

use crate::model::path::Path;
use crate::model::shape::ShapeId;

/// Fields shared by every constraint variant.
#[derive(Debug, Clone)]
pub struct ConstraintBase {
    pub path: Path,
    pub datatype: Option<String>,
    pub value: Option<String>,
    pub shape_ref: Option<ShapeId>,
    /// `negated` marks the constraint as matched by its complement; the
    /// source only handles this for simple (non-disjunctive) constraints.
    pub negated: bool,
    /// Non-empty when this constraint is one branch of a disjunction; the
    /// disjunction itself is represented by a constraint whose `options`
    /// list is non-empty and whose own cardinality is not otherwise used.
    pub options: Vec<Constraint>,
}

impl ConstraintBase {
    pub fn new(path: Path) -> Self {
        ConstraintBase {
            path,
            datatype: None,
            value: None,
            shape_ref: None,
            negated: false,
            options: Vec::new(),
        }
    }
}

/// `min = -1` means "no lower bound", `max = -1` means "no upper bound" at
/// the shape-schema-input boundary; once parsed into a `Constraint` the
/// absence of a bound is represented by variant choice instead, per the
/// tagged-variant design note.
#[derive(Debug, Clone)]
pub enum Constraint {
    MinOnly { base: ConstraintBase, min: u32 },
    MaxOnly { base: ConstraintBase, max: u32 },
    MinMax { base: ConstraintBase, min: u32, max: u32 },
    Raw { base: ConstraintBase, query: String },
}

impl Constraint {
    pub fn base(&self) -> &ConstraintBase {
        match self {
            Constraint::MinOnly { base, .. } => base,
            Constraint::MaxOnly { base, .. } => base,
            Constraint::MinMax { base, .. } => base,
            Constraint::Raw { base, .. } => base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ConstraintBase {
        match self {
            Constraint::MinOnly { base, .. } => base,
            Constraint::MaxOnly { base, .. } => base,
            Constraint::MinMax { base, .. } => base,
            Constraint::Raw { base, .. } => base,
        }
    }

    pub fn min(&self) -> Option<u32> {
        match self {
            Constraint::MinOnly { min, .. } => Some(*min),
            Constraint::MinMax { min, .. } => Some(*min),
            _ => None,
        }
    }

    pub fn max(&self) -> Option<u32> {
        match self {
            Constraint::MaxOnly { max, .. } => Some(*max),
            Constraint::MinMax { max, .. } => Some(*max),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.base().shape_ref.is_some()
    }

    /// How many object variables this constraint needs, one per expected
    /// cardinality slot, mirroring `VariableGenerator` usage in
    /// `MinOnlyConstraint.compute_object_variables` et al.: the larger of
    /// `min`/`max` when both are present, otherwise whichever bound exists,
    /// and a single variable for `Raw` (its ASK form binds no object).
    pub fn variable_count(&self) -> u32 {
        match self {
            Constraint::MinOnly { min, .. } => *min,
            Constraint::MaxOnly { max, .. } => max + 1,
            Constraint::MinMax { min, max, .. } => (*min).max(max + 1),
            Constraint::Raw { .. } => 0,
        }
    }

    /// The rule-pattern body for this constraint: one atom per generated
    /// object variable, referencing the constrained shape — mirrors
    /// `Constraint.compute_rule_pattern_body` (`[(shapeRef, v, isPos) for v
    /// in variables]`).
    pub fn rule_pattern_body(&self, variables: &[String]) -> Vec<(ShapeId, String, bool)> {
        let Some(shape_ref) = self.base().shape_ref else {
            return Vec::new();
        };
        let polarity = !self.base().negated;
        variables
            .iter()
            .map(|v| (shape_ref, v.clone(), polarity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ConstraintBase {
        ConstraintBase::new(Path::forward("http://ex.org/p"))
    }

    #[test]
    fn min_max_reports_both_bounds() {
        let c = Constraint::MinMax {
            base: base(),
            min: 2,
            max: 3,
        };
        assert_eq!(c.min(), Some(2));
        assert_eq!(c.max(), Some(3));
    }

    #[test]
    fn min_only_has_no_max() {
        let c = Constraint::MinOnly { base: base(), min: 1 };
        assert_eq!(c.max(), None);
    }

    #[test]
    fn rule_pattern_body_empty_without_shape_ref() {
        let c = Constraint::MinOnly { base: base(), min: 1 };
        assert!(c.rule_pattern_body(&["p_0".to_string()]).is_empty());
    }
}
