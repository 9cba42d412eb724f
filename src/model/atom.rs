//! The in-memory term algebra: atoms and rule patterns.
//!
//! Grounded in `original_source/TravSHACL/core/RulePattern.py`: a rule
//! pattern is a head-atom template plus a sequence of body-atom templates;
//! substituting concrete individuals for variables grounds it into an atom
//! and a set of body atoms.

use std::fmt;

/// `(predicate, individual, polarity)`. `predicate` is either a shape id or
/// a constraint-query id — both are plain strings in the shape-schema input,
/// so no separate id type is introduced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub predicate: String,
    pub individual: String,
    pub polarity: bool,
}

impl Atom {
    pub fn new(predicate: impl Into<String>, individual: impl Into<String>, polarity: bool) -> Self {
        Atom {
            predicate: predicate.into(),
            individual: individual.into(),
            polarity,
        }
    }

    /// The atom with its polarity flipped; `a.negate().negate() == a`.
    pub fn negate(&self) -> Atom {
        Atom {
            predicate: self.predicate.clone(),
            individual: self.individual.clone(),
            polarity: !self.polarity,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.polarity {
            write!(f, "{}({})", self.predicate, self.individual)
        } else {
            write!(f, "¬{}({})", self.predicate, self.individual)
        }
    }
}

/// An atom template: the predicate and polarity are fixed, but `var` names
/// the variable bound during grounding (`"x"` for the focus node, or one of
/// the generated object variables `p_0`, `p_1`, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtomPattern {
    pub predicate: String,
    pub var: String,
    pub polarity: bool,
}

impl AtomPattern {
    pub fn new(predicate: impl Into<String>, var: impl Into<String>, polarity: bool) -> Self {
        AtomPattern {
            predicate: predicate.into(),
            var: var.into(),
            polarity,
        }
    }

    /// Substitutes the variable's bound value to ground this pattern into a
    /// concrete atom. Returns `None` when the binding has no value for
    /// `self.var` — the caller treats this as "not yet inferable".
    pub fn ground(&self, bindings: &std::collections::HashMap<String, String>) -> Option<Atom> {
        bindings
            .get(&self.var)
            .map(|value| Atom::new(self.predicate.clone(), value.clone(), self.polarity))
    }
}

/// A head atom pattern plus a body of atom patterns. All bodies sharing a
/// head are stored separately in `rule_map` as a disjunction of conjunctions
/// (the rule pattern itself models one conjunction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePattern {
    pub head: AtomPattern,
    pub body: Vec<AtomPattern>,
}

impl RulePattern {
    pub fn new(head: AtomPattern, body: Vec<AtomPattern>) -> Self {
        RulePattern { head, body }
    }

    /// The distinct variable names appearing in the head and body.
    pub fn variables(&self) -> Vec<String> {
        let mut vars = vec![self.head.var.clone()];
        for atom in &self.body {
            if !vars.contains(&atom.var) {
                vars.push(atom.var.clone());
            }
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negate_is_involutive() {
        let a = Atom::new("shape:A", "ex:a1", true);
        assert_eq!(a.negate().negate(), a);
        assert!(!a.negate().polarity);
    }

    #[test]
    fn ground_substitutes_bound_variable() {
        let pattern = AtomPattern::new("shape:B", "p_0", true);
        let mut bindings = std::collections::HashMap::new();
        bindings.insert("p_0".to_string(), "ex:b1".to_string());
        let atom = pattern.ground(&bindings).unwrap();
        assert_eq!(atom, Atom::new("shape:B", "ex:b1", true));
    }

    #[test]
    fn ground_returns_none_when_unbound() {
        let pattern = AtomPattern::new("shape:B", "p_0", true);
        let bindings = std::collections::HashMap::new();
        assert!(pattern.ground(&bindings).is_none());
    }
}
