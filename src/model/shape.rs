//! Shape and the arena that owns them.
//!
//! Grounded in `original_source/TravSHACL/core/Shape.py`, redesigned per the
//! "mutable cyclic graph of shapes and parents" note in `spec.md` §9: a
//! single `Schema` owns every `Shape` by integer handle, so
//! `referenced_shapes` is a map of handles rather than a back-reference
//! cycle the original code resolves with weak pointers.

use std::collections::{HashMap, HashSet};

use crate::model::constraint::Constraint;
use crate::model::path::Path;

/// An index into `Schema::shapes`. Cheap to copy, hashable, and stable for
/// the lifetime of the owning `Schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Class,
    Node,
    None,
}

/// The two sets of a shape's classified targets. Grows monotonically during
/// validation (invariant 3, `spec.md` §8).
#[derive(Debug, Clone, Default)]
pub struct TargetSets {
    pub valid: HashSet<String>,
    pub violated: HashSet<String>,
}

impl TargetSets {
    pub fn register_valid(&mut self, target: impl Into<String>) {
        self.valid.insert(target.into());
    }

    pub fn register_violated(&mut self, target: impl Into<String>) {
        self.violated.insert(target.into());
    }

    /// `true` once a target is classified at all; a shape is total when this
    /// holds for every target the plain target query returned.
    pub fn contains(&self, target: &str) -> bool {
        self.valid.contains(target) || self.violated.contains(target)
    }
}

#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    /// The raw query body binding the focus variable `?x` (e.g. `?x a
    /// :Person .`), or `None` when this shape has no target selector and is
    /// only ever reached by reference from another shape.
    pub target_def: Option<String>,
    pub target_type: TargetKind,
    pub constraints: Vec<Constraint>,
    /// Shapes referenced by this one's constraints, keyed by the path used
    /// to reach them.
    pub referenced_shapes: HashMap<ShapeId, Path>,
    pub in_degree: u32,
    pub out_degree: u32,
    pub prefixes: Vec<(String, String)>,
    pub include_prefixes: bool,
    pub order_by: bool,
    pub targets: TargetSets,
}

impl Shape {
    pub fn new(id: ShapeId, name: impl Into<String>) -> Self {
        Shape {
            id,
            name: name.into(),
            target_def: None,
            target_type: TargetKind::None,
            constraints: Vec::new(),
            referenced_shapes: HashMap::new(),
            in_degree: 0,
            out_degree: 0,
            prefixes: Vec::new(),
            include_prefixes: false,
            order_by: false,
            targets: TargetSets::default(),
        }
    }

    pub fn has_target_selector(&self) -> bool {
        self.target_def.is_some()
    }
}

/// Owns every `Shape` in a validation run, indexed by `ShapeId`.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    shapes: Vec<Shape>,
    name_to_id: HashMap<String, ShapeId>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Inserts a shape under a freshly allocated id and returns it.
    pub fn insert(&mut self, name: impl Into<String>) -> ShapeId {
        let id = ShapeId(self.shapes.len());
        let name = name.into();
        self.shapes.push(Shape::new(id, name.clone()));
        self.name_to_id.insert(name, id);
        id
    }

    pub fn get(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }

    pub fn get_mut(&mut self, id: ShapeId) -> &mut Shape {
        &mut self.shapes[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<ShapeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        (0..self.shapes.len()).map(ShapeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Recomputes `in_degree`/`out_degree` on every shape from the current
    /// `referenced_shapes` maps, for the TraversalPlanner's `degree`
    /// heuristic.
    pub fn recompute_degrees(&mut self) {
        let mut in_degrees: HashMap<ShapeId, u32> = HashMap::new();
        for shape in &self.shapes {
            for &referenced in shape.referenced_shapes.keys() {
                *in_degrees.entry(referenced).or_insert(0) += 1;
            }
        }
        for shape in &mut self.shapes {
            shape.out_degree = shape.referenced_shapes.len() as u32;
            shape.in_degree = in_degrees.get(&shape.id).copied().unwrap_or(0);
        }
    }

    pub fn max_in_degree(&self) -> u32 {
        self.shapes.iter().map(|s| s.in_degree).max().unwrap_or(0)
    }

    pub fn max_out_degree(&self) -> u32 {
        self.shapes.iter().map(|s| s.out_degree).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_increasing_ids() {
        let mut schema = Schema::new();
        let a = schema.insert("A");
        let b = schema.insert("B");
        assert_eq!(a, ShapeId(0));
        assert_eq!(b, ShapeId(1));
        assert_eq!(schema.id_of("A"), Some(a));
    }

    #[test]
    fn recompute_degrees_counts_references() {
        let mut schema = Schema::new();
        let a = schema.insert("A");
        let b = schema.insert("B");
        schema
            .get_mut(a)
            .referenced_shapes
            .insert(b, Path::forward("http://ex.org/p"));
        schema.recompute_degrees();
        assert_eq!(schema.get(a).out_degree, 1);
        assert_eq!(schema.get(b).in_degree, 1);
        assert_eq!(schema.get(a).in_degree, 0);
    }
}
