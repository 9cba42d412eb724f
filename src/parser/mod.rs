//! The shape-schema parsing boundary (`spec.md` §6): turns shape files on
//! disk into a `Schema`. Parsing itself is out of scope for the engine's own
//! guarantees — it exists to get shapes loaded so the engine can run.

pub mod input;
pub mod json;
pub mod rdf;

use std::collections::HashMap;
use std::path::Path as FsPath;

use crate::err::{Result, ShaclError};
use crate::model::constraint::{Constraint, ConstraintBase};
use crate::model::path::Path;
use crate::model::shape::{Schema, ShapeId, TargetKind};
use input::{ConstraintInput, ShapeSchemaInput, TargetTypeInput};

/// Loads every shape file under `dir` (RDF by default, JSON when `use_json`
/// is set, matching `--json`) and assembles them into a `Schema`.
pub fn load_schema_dir(dir: &FsPath, use_json: bool) -> Result<Schema> {
    let inputs = if use_json { json::load_directory(dir)? } else { rdf::load_directory(dir)? };
    if inputs.is_empty() {
        return Err(ShaclError::Schema(format!("no shapes parsed from '{}'", dir.display())));
    }
    build_schema(inputs)
}

/// Resolves shape-reference names into `ShapeId`s and assembles a `Schema`.
pub fn build_schema(inputs: Vec<ShapeSchemaInput>) -> Result<Schema> {
    let mut schema = Schema::new();
    let mut name_to_id = HashMap::new();
    for input in &inputs {
        let id = schema.insert(input.id.clone());
        name_to_id.insert(input.id.clone(), id);
    }

    for input in inputs {
        let id = name_to_id[&input.id];
        {
            let shape = schema.get_mut(id);
            shape.target_type = match input.target_type {
                TargetTypeInput::Class => TargetKind::Class,
                TargetTypeInput::Node => TargetKind::Node,
                TargetTypeInput::None => TargetKind::None,
            };
            shape.target_def = input.target_def.clone().or_else(|| input.target_query.clone());
            shape.prefixes = input.prefixes.clone();
            shape.include_prefixes = input.include_prefixes;
            shape.order_by = input.order_by;
        }

        for constraint_input in &input.constraints {
            let constraint = build_constraint(constraint_input, &name_to_id)?;
            if let Some(shape_ref) = constraint.base().shape_ref {
                schema.get_mut(id).referenced_shapes.insert(shape_ref, constraint.base().path.clone());
            }
            schema.get_mut(id).constraints.push(constraint);
        }
    }

    schema.recompute_degrees();
    Ok(schema)
}

fn build_constraint(input: &ConstraintInput, name_to_id: &HashMap<String, ShapeId>) -> Result<Constraint> {
    let mut base = ConstraintBase::new(Path::parse(&input.path));
    base.datatype = input.datatype.clone();
    base.value = input.value.clone();
    base.negated = input.negated;
    if let Some(name) = &input.shape_ref {
        let shape_id = name_to_id
            .get(name)
            .copied()
            .ok_or_else(|| ShaclError::Plan(format!("constraint references unknown shape '{}'", name)))?;
        base.shape_ref = Some(shape_id);
    }
    for option in &input.options {
        base.options.push(build_constraint(option, name_to_id)?);
    }

    if let Some(query) = &input.raw_query {
        return Ok(Constraint::Raw { base, query: query.clone() });
    }
    if input.min < 0 && input.max < 0 {
        if !base.options.is_empty() {
            // Disjunction constraints carry no cardinality of their own;
            // QueryPlanner::disjunction_query only ever reads `base.options`.
            return Ok(Constraint::MinOnly { base, min: 0 });
        }
        return Err(ShaclError::Plan(format!(
            "constraint on path '{}' has neither a cardinality bound nor a raw query",
            input.path
        )));
    }
    match (input.min, input.max) {
        (min, max) if min >= 0 && max >= 0 => Ok(Constraint::MinMax { base, min: min as u32, max: max as u32 }),
        (min, _) if min >= 0 => Ok(Constraint::MinOnly { base, min: min as u32 }),
        (_, max) => Ok(Constraint::MaxOnly { base, max: max as u32 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_schema_and_resolves_shape_references() {
        let a = ShapeSchemaInput {
            id: "A".to_string(),
            target_type: TargetTypeInput::Class,
            target_def: Some("?x a :A .".to_string()),
            constraints: vec![ConstraintInput {
                path: ":knows".to_string(),
                min: 1,
                max: -1,
                shape_ref: Some("B".to_string()),
                ..ConstraintInput::default()
            }],
            ..ShapeSchemaInput::default()
        };
        let b = ShapeSchemaInput {
            id: "B".to_string(),
            target_type: TargetTypeInput::Class,
            target_def: Some("?x a :B .".to_string()),
            ..ShapeSchemaInput::default()
        };

        let schema = build_schema(vec![a, b]).unwrap();
        assert_eq!(schema.len(), 2);
        let a_id = schema.id_of("A").unwrap();
        let b_id = schema.id_of("B").unwrap();
        let shape_a = schema.get(a_id);
        assert_eq!(shape_a.referenced_shapes.get(&b_id).map(|p| p.to_string()), Some(":knows".to_string()));
    }

    #[test]
    fn rejects_unknown_shape_reference() {
        let a = ShapeSchemaInput {
            id: "A".to_string(),
            constraints: vec![ConstraintInput {
                path: ":knows".to_string(),
                min: 1,
                shape_ref: Some("Missing".to_string()),
                ..ConstraintInput::default()
            }],
            ..ShapeSchemaInput::default()
        };
        assert!(build_schema(vec![a]).is_err());
    }

    #[test]
    fn disjunction_only_constraint_gets_inert_min_wrapper() {
        let a = ShapeSchemaInput {
            id: "A".to_string(),
            constraints: vec![ConstraintInput {
                options: vec![
                    ConstraintInput { path: ":p".to_string(), min: 1, ..ConstraintInput::default() },
                    ConstraintInput { path: ":q".to_string(), min: 1, ..ConstraintInput::default() },
                ],
                ..ConstraintInput::default()
            }],
            ..ShapeSchemaInput::default()
        };
        let schema = build_schema(vec![a]).unwrap();
        let id = schema.id_of("A").unwrap();
        let constraint = &schema.get(id).constraints[0];
        assert_eq!(constraint.base().options.len(), 2);
    }
}
