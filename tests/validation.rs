//! Integration tests running the full engine (`build_schema` → `Endpoint::in_memory`
//! → `ValidationEngine::exec`) against the scenarios this crate's testable
//! properties describe.

use travshacl::parser::build_schema;
use travshacl::parser::input::{ConstraintInput, ShapeSchemaInput, TargetTypeInput};
use travshacl::rdf::read_graph_from_string;
use travshacl::{Config, Endpoint, ValidationEngine};

fn run(inputs: Vec<ShapeSchemaInput>, ntriples: &str) -> travshacl::Schema {
    let schema = build_schema(inputs).unwrap();
    let graph = read_graph_from_string(ntriples, "nt").unwrap();
    let endpoint = Endpoint::in_memory(graph).unwrap();
    let config = Config::new("shapes".into(), "memory".into(), "out".into());
    let mut engine = ValidationEngine::new(schema, endpoint, config);
    engine.exec().unwrap();
    engine.schema().clone()
}

fn min_constraint(path: &str, min: i32, shape_ref: Option<&str>) -> ConstraintInput {
    ConstraintInput {
        path: path.to_string(),
        min,
        max: -1,
        shape_ref: shape_ref.map(str::to_string),
        ..ConstraintInput::default()
    }
}

/// S1: single shape, min-1 cardinality, no references. Three of four
/// declared targets have the required property.
#[test]
fn s1_plain_min_cardinality() {
    let a = ShapeSchemaInput {
        id: "A".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/A> .".to_string()),
        constraints: vec![min_constraint("http://ex.org/p", 1, None)],
        ..ShapeSchemaInput::default()
    };

    let data = r#"
        <http://ex.org/a1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a3> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a4> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a1> <http://ex.org/p> <http://ex.org/o1> .
        <http://ex.org/a2> <http://ex.org/p> <http://ex.org/o1> .
        <http://ex.org/a3> <http://ex.org/p> <http://ex.org/o1> .
    "#;

    let schema = run(vec![a], data);
    let shape = schema.get(schema.id_of("A").unwrap());
    assert_eq!(shape.targets.valid.len() + shape.targets.violated.len(), 4);
    assert!(shape.targets.valid.contains("http://ex.org/a1"));
    assert!(shape.targets.valid.contains("http://ex.org/a2"));
    assert!(shape.targets.valid.contains("http://ex.org/a3"));
    assert!(shape.targets.violated.contains("http://ex.org/a4"));
}

/// S2: A references B (min 1 on `p`), B has its own min-1 constraint on `q`.
/// a1→b1 and b1 satisfies q; a2→b2 but b2 has no q.
#[test]
fn s2_shape_to_shape_reference() {
    let a = ShapeSchemaInput {
        id: "A".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/A> .".to_string()),
        constraints: vec![min_constraint("http://ex.org/p", 1, Some("B"))],
        ..ShapeSchemaInput::default()
    };
    let b = ShapeSchemaInput {
        id: "B".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/B> .".to_string()),
        constraints: vec![min_constraint("http://ex.org/q", 1, None)],
        ..ShapeSchemaInput::default()
    };

    let data = r#"
        <http://ex.org/a1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/b1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/B> .
        <http://ex.org/b2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/B> .
        <http://ex.org/a1> <http://ex.org/p> <http://ex.org/b1> .
        <http://ex.org/a2> <http://ex.org/p> <http://ex.org/b2> .
        <http://ex.org/b1> <http://ex.org/q> <http://ex.org/v1> .
    "#;

    let schema = run(vec![a, b], data);
    let a_shape = schema.get(schema.id_of("A").unwrap());
    let b_shape = schema.get(schema.id_of("B").unwrap());

    assert!(b_shape.targets.valid.contains("http://ex.org/b1"));
    assert!(b_shape.targets.violated.contains("http://ex.org/b2"));
    assert!(a_shape.targets.valid.contains("http://ex.org/a1"));
    assert!(a_shape.targets.violated.contains("http://ex.org/a2"));
}

/// S4: max-0 shape reference. A forbids any `p`-link to a valid member of B.
/// a1 has no `p` link (valid); a2 links to b1, a valid B (violated); a3
/// links to b2, which fails B's own constraint so the reference doesn't
/// count against A's bound (valid).
#[test]
fn s4_max_zero_shape_reference() {
    let a = ShapeSchemaInput {
        id: "A".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/A> .".to_string()),
        constraints: vec![ConstraintInput {
            path: "http://ex.org/p".to_string(),
            min: -1,
            max: 0,
            shape_ref: Some("B".to_string()),
            ..ConstraintInput::default()
        }],
        ..ShapeSchemaInput::default()
    };
    let b = ShapeSchemaInput {
        id: "B".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/B> .".to_string()),
        constraints: vec![min_constraint("http://ex.org/q", 1, None)],
        ..ShapeSchemaInput::default()
    };

    let data = r#"
        <http://ex.org/a1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a3> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/b1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/B> .
        <http://ex.org/b2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/B> .
        <http://ex.org/a2> <http://ex.org/p> <http://ex.org/b1> .
        <http://ex.org/a3> <http://ex.org/p> <http://ex.org/b2> .
        <http://ex.org/b1> <http://ex.org/q> <http://ex.org/v1> .
    "#;

    let schema = run(vec![a, b], data);
    let a_shape = schema.get(schema.id_of("A").unwrap());
    assert!(a_shape.targets.valid.contains("http://ex.org/a1"));
    assert!(a_shape.targets.violated.contains("http://ex.org/a2"));
    assert!(a_shape.targets.valid.contains("http://ex.org/a3"));
}

/// S5: disjunction — either max-0 on `p`, or min-1 on `q`. a1 satisfies the
/// second branch, a2 violates both, a3 satisfies by having neither (the
/// max-0 branch alone is met vacuously).
#[test]
fn s5_disjunctive_constraint() {
    let a = ShapeSchemaInput {
        id: "A".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/A> .".to_string()),
        constraints: vec![ConstraintInput {
            options: vec![
                ConstraintInput {
                    path: "http://ex.org/p".to_string(),
                    min: -1,
                    max: 0,
                    ..ConstraintInput::default()
                },
                min_constraint("http://ex.org/q", 1, None),
            ],
            ..ConstraintInput::default()
        }],
        ..ShapeSchemaInput::default()
    };

    let data = r#"
        <http://ex.org/a1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a3> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a1> <http://ex.org/q> <http://ex.org/v1> .
        <http://ex.org/a2> <http://ex.org/p> <http://ex.org/o1> .
    "#;

    let schema = run(vec![a], data);
    let shape = schema.get(schema.id_of("A").unwrap());
    assert!(shape.targets.valid.contains("http://ex.org/a1"));
    assert!(shape.targets.valid.contains("http://ex.org/a3"));
    assert!(shape.targets.violated.contains("http://ex.org/a2"));
}

/// S6: cardinality range [2, 3] on `p`. a1 has 1 (too few), a2 has 2, a3 has
/// 3, a4 has 4 (too many).
#[test]
fn s6_min_max_range() {
    let a = ShapeSchemaInput {
        id: "A".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/A> .".to_string()),
        constraints: vec![ConstraintInput {
            path: "http://ex.org/p".to_string(),
            min: 2,
            max: 3,
            ..ConstraintInput::default()
        }],
        ..ShapeSchemaInput::default()
    };

    let mut data = String::from(
        r#"
        <http://ex.org/a1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a3> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a4> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        "#,
    );
    for (subject, count) in [("a1", 1), ("a2", 2), ("a3", 3), ("a4", 4)] {
        for i in 0..count {
            data.push_str(&format!(
                "<http://ex.org/{}> <http://ex.org/p> <http://ex.org/o{}> .\n",
                subject, i
            ));
        }
    }

    let schema = run(vec![a], &data);
    let shape = schema.get(schema.id_of("A").unwrap());
    assert!(shape.targets.valid.contains("http://ex.org/a2"));
    assert!(shape.targets.valid.contains("http://ex.org/a3"));
    assert!(shape.targets.violated.contains("http://ex.org/a1"));
    assert!(shape.targets.violated.contains("http://ex.org/a4"));
}

/// Invariant 1 (Totality, `spec.md` §8): every declared target ends up in
/// exactly one of valid/violated, never neither or both.
#[test]
fn totality_and_partition() {
    let a = ShapeSchemaInput {
        id: "A".to_string(),
        target_type: TargetTypeInput::Class,
        target_def: Some("?x a <http://ex.org/A> .".to_string()),
        constraints: vec![min_constraint("http://ex.org/p", 1, None)],
        ..ShapeSchemaInput::default()
    };
    let data = r#"
        <http://ex.org/a1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a1> <http://ex.org/p> <http://ex.org/o1> .
    "#;

    let schema = run(vec![a], data);
    let shape = schema.get(schema.id_of("A").unwrap());
    assert!(shape.targets.valid.is_disjoint(&shape.targets.violated));
    assert_eq!(shape.targets.valid.len() + shape.targets.violated.len(), 2);
}

/// Invariant 4 (Determinism, `spec.md` §8): the same schema and endpoint
/// produce the same classification across independent runs.
#[test]
fn determinism_across_runs() {
    let build = || {
        vec![ShapeSchemaInput {
            id: "A".to_string(),
            target_type: TargetTypeInput::Class,
            target_def: Some("?x a <http://ex.org/A> .".to_string()),
            constraints: vec![min_constraint("http://ex.org/p", 1, None)],
            ..ShapeSchemaInput::default()
        }]
    };
    let data = r#"
        <http://ex.org/a1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a2> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://ex.org/A> .
        <http://ex.org/a1> <http://ex.org/p> <http://ex.org/o1> .
    "#;

    let first = run(build(), data);
    let second = run(build(), data);
    let a1 = first.id_of("A").unwrap();
    let a2 = second.id_of("A").unwrap();
    assert_eq!(first.get(a1).targets.valid, second.get(a2).targets.valid);
    assert_eq!(first.get(a1).targets.violated, second.get(a2).targets.violated);
}
