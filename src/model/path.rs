//! A property path reduced to the subset the engine needs to emit SPARQL:
//! a single predicate IRI, walked forward or inverse.
//!
//! The teacher's `core::path::PathElement` resolves paths against a locally
//! borrowed `oxigraph` graph (alternative/zero-or-more/one-or-more path
//! elements included). The engine here never walks a local graph directly —
//! every path is rendered into a query string and the endpoint resolves it —
//! so only the forward/inverse distinction from the shape-schema input
//! (`spec.md` §6's leading `^`) survives.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    pub predicate: String,
    pub inverse: bool,
}

impl Path {
    pub fn forward(predicate: impl Into<String>) -> Self {
        Path {
            predicate: predicate.into(),
            inverse: false,
        }
    }

    pub fn inverse(predicate: impl Into<String>) -> Self {
        Path {
            predicate: predicate.into(),
            inverse: true,
        }
    }

    /// Parses the `^`-prefixed inverse-path convention of the shape-schema
    /// input boundary.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('^') {
            Some(rest) => Path::inverse(rest),
            None => Path::forward(raw),
        }
    }

    /// Renders a triple pattern binding `subject_var` and `object_var` along
    /// this path, honoring the forward/inverse direction.
    pub fn triple_pattern(&self, subject_var: &str, object_var: &str) -> String {
        if self.inverse {
            format!("?{} <{}> ?{} .", object_var, self.predicate, subject_var)
        } else {
            format!("?{} <{}> ?{} .", subject_var, self.predicate, object_var)
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverse {
            write!(f, "^{}", self.predicate)
        } else {
            write!(f, "{}", self.predicate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inverse_prefix() {
        let p = Path::parse("^http://ex.org/p");
        assert!(p.inverse);
        assert_eq!(p.predicate, "http://ex.org/p");
    }

    #[test]
    fn parses_forward_by_default() {
        let p = Path::parse("http://ex.org/p");
        assert!(!p.inverse);
    }

    #[test]
    fn triple_pattern_swaps_subject_object_when_inverse() {
        let p = Path::inverse("http://ex.org/p");
        assert_eq!(
            p.triple_pattern("x", "v0"),
            "?v0 <http://ex.org/p> ?x ."
        );
    }
}
