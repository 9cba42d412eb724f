//! The in-memory term algebra and schema data model (`spec.md` §3).

pub mod atom;
pub mod constraint;
pub mod path;
pub mod query;
pub mod shape;

pub use atom::{Atom, AtomPattern, RulePattern};
pub use constraint::{Constraint, ConstraintBase};
pub use path::Path;
pub use query::Query;
pub use shape::{Schema, Shape, ShapeId, TargetKind, TargetSets};
