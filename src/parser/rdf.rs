//! RDF (Turtle) shape-file loading, the default form (`spec.md` §6). A
//! trimmed-down walk over `sh:targetClass`/`targetNode`, `sh:property`,
//! `sh:path`, `sh:minCount`/`maxCount`, `sh:class`/`sh:node` (shape
//! reference), `sh:or`, and `sh:sparql` — scoped down from the teacher's
//! full SHACL-core `parser` module, which also covers datatype/pattern/...
//! constraints this constraint model doesn't carry.

use std::collections::HashSet;
use std::path::Path as FsPath;

use oxigraph::model::vocab::rdf;
use oxigraph::model::{Graph, NamedNodeRef, NamedOrBlankNodeRef, TermRef};

use crate::err::{Result, ShaclError};
use crate::rdf::read_graph_from_file;
use crate::vocab::sh;

use super::input::{ConstraintInput, ShapeSchemaInput, TargetTypeInput};

pub fn load_directory(dir: &FsPath) -> Result<Vec<ShapeSchemaInput>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ShaclError::Schema(format!("shape directory '{}' not found: {}", dir.display(), e)))?;

    let mut graph = Graph::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            continue;
        }
        let file_graph = read_graph_from_file(&path, None)?;
        graph.extend(file_graph.iter().map(|t| t.into_owned()));
    }

    parse_graph(&graph)
}

pub fn parse_graph(graph: &Graph) -> Result<Vec<ShapeSchemaInput>> {
    let mut shapes = Vec::new();
    let mut seen = HashSet::new();

    for node in shape_nodes(graph) {
        if !seen.insert(node) {
            continue;
        }
        shapes.push(parse_shape(graph, node)?);
    }
    Ok(shapes)
}

fn shape_nodes(graph: &Graph) -> Vec<NamedOrBlankNodeRef<'_>> {
    let mut nodes = Vec::new();
    for predicate in [sh::TARGET_CLASS, sh::TARGET_NODE] {
        nodes.extend(graph.triples_for_predicate(predicate).map(|t| t.subject));
    }
    nodes
}

fn node_name(node: NamedOrBlankNodeRef<'_>) -> String {
    match node {
        NamedOrBlankNodeRef::NamedNode(nn) => nn.as_str().to_string(),
        NamedOrBlankNodeRef::BlankNode(bn) => format!("_:{}", bn.as_str()),
    }
}

fn as_named_or_blank(term: TermRef<'_>) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        TermRef::NamedNode(nn) => Some(NamedOrBlankNodeRef::NamedNode(nn)),
        TermRef::BlankNode(bn) => Some(NamedOrBlankNodeRef::BlankNode(bn)),
        TermRef::Literal(_) => None,
    }
}

fn term_literal(term: TermRef<'_>) -> String {
    match term {
        TermRef::NamedNode(nn) => format!("<{}>", nn.as_str()),
        TermRef::BlankNode(bn) => format!("_:{}", bn.as_str()),
        TermRef::Literal(lit) => lit.to_string(),
    }
}

fn integer_value(graph: &Graph, node: NamedOrBlankNodeRef<'_>, predicate: NamedNodeRef<'_>) -> Option<i32> {
    match graph.object_for_subject_predicate(node, predicate) {
        Some(TermRef::Literal(lit)) => lit.value().parse::<i32>().ok(),
        _ => None,
    }
}

fn string_value(graph: &Graph, node: NamedOrBlankNodeRef<'_>, predicate: NamedNodeRef<'_>) -> Option<String> {
    match graph.object_for_subject_predicate(node, predicate) {
        Some(TermRef::Literal(lit)) => Some(lit.value().to_string()),
        _ => None,
    }
}

fn shape_ref_name(graph: &Graph, node: NamedOrBlankNodeRef<'_>, predicate: NamedNodeRef<'_>) -> Option<String> {
    match graph.object_for_subject_predicate(node, predicate) {
        Some(TermRef::NamedNode(nn)) => Some(nn.as_str().to_string()),
        _ => None,
    }
}

/// Walks an RDF list (`rdf:first`/`rdf:rest`), stopping at `rdf:nil` or the
/// first malformed cell.
fn rdf_list<'a>(graph: &'a Graph, list_node: NamedOrBlankNodeRef<'a>) -> Vec<TermRef<'a>> {
    let mut result = Vec::new();
    let mut current = list_node;
    loop {
        if let NamedOrBlankNodeRef::NamedNode(nn) = current {
            if nn == rdf::NIL {
                break;
            }
        }
        let Some(first) = graph.object_for_subject_predicate(current, rdf::FIRST) else {
            break;
        };
        result.push(first);
        match graph.object_for_subject_predicate(current, rdf::REST) {
            Some(TermRef::NamedNode(nn)) => current = NamedOrBlankNodeRef::NamedNode(nn),
            Some(TermRef::BlankNode(bn)) => current = NamedOrBlankNodeRef::BlankNode(bn),
            _ => break,
        }
    }
    result
}

fn parse_path_term(graph: &Graph, term: TermRef<'_>) -> Result<String> {
    match term {
        TermRef::NamedNode(nn) => Ok(nn.as_str().to_string()),
        TermRef::BlankNode(bn) => {
            let node = NamedOrBlankNodeRef::BlankNode(bn);
            match graph.object_for_subject_predicate(node, sh::INVERSE_PATH) {
                Some(TermRef::NamedNode(inner)) => Ok(format!("^{}", inner.as_str())),
                _ => Err(ShaclError::Plan("unsupported sh:path value: only IRIs and sh:inversePath are accepted".to_string())),
            }
        }
        _ => Err(ShaclError::Plan("sh:path must be an IRI or an inverse-path blank node".to_string())),
    }
}

/// Parses one `sh:property`-style node (or `sh:or` list member) into a
/// constraint input. Returns `None` when the node has no `sh:path` — such a
/// node can't ground a triple pattern and is skipped.
fn parse_constraint(graph: &Graph, node: NamedOrBlankNodeRef<'_>) -> Result<Option<ConstraintInput>> {
    let path = match graph.object_for_subject_predicate(node, sh::PATH) {
        Some(term) => parse_path_term(graph, term)?,
        None => return Ok(None),
    };

    let raw_query = match as_named_or_blank_object(graph, node, sh::SPARQL) {
        Some(sparql_node) => string_value(graph, sparql_node, sh::ASK).or_else(|| string_value(graph, sparql_node, sh::SELECT)),
        None => None,
    };

    Ok(Some(ConstraintInput {
        path,
        min: integer_value(graph, node, sh::MIN_COUNT).unwrap_or(-1),
        max: integer_value(graph, node, sh::MAX_COUNT).unwrap_or(-1),
        datatype: shape_ref_name(graph, node, sh::DATATYPE),
        value: graph.object_for_subject_predicate(node, sh::HAS_VALUE).map(term_literal),
        shape_ref: shape_ref_name(graph, node, sh::NODE).or_else(|| shape_ref_name(graph, node, sh::CLASS)),
        negated: false,
        options: Vec::new(),
        raw_query,
    }))
}

fn as_named_or_blank_object<'a>(graph: &'a Graph, node: NamedOrBlankNodeRef<'a>, predicate: NamedNodeRef<'a>) -> Option<NamedOrBlankNodeRef<'a>> {
    graph.object_for_subject_predicate(node, predicate).and_then(as_named_or_blank)
}

fn parse_shape(graph: &Graph, node: NamedOrBlankNodeRef<'_>) -> Result<ShapeSchemaInput> {
    let mut shape = ShapeSchemaInput {
        id: node_name(node),
        ..ShapeSchemaInput::default()
    };

    if let Some(TermRef::NamedNode(class)) = graph.object_for_subject_predicate(node, sh::TARGET_CLASS) {
        shape.target_type = TargetTypeInput::Class;
        shape.target_def = Some(format!("?x a <{}> .", class.as_str()));
    } else if let Some(target_node) = graph.object_for_subject_predicate(node, sh::TARGET_NODE) {
        shape.target_type = TargetTypeInput::Node;
        shape.target_def = Some(format!("VALUES ?x {{ {} }}", term_literal(target_node)));
    }

    for prop in graph.objects_for_subject_predicate(node, sh::PROPERTY) {
        let Some(prop_node) = as_named_or_blank(prop) else { continue };
        if let Some(constraint) = parse_constraint(graph, prop_node)? {
            shape.constraints.push(constraint);
        }
    }

    for option_list in graph.objects_for_subject_predicate(node, sh::OR) {
        let Some(list_node) = as_named_or_blank(option_list) else { continue };
        let mut options = Vec::new();
        for item in rdf_list(graph, list_node) {
            let Some(item_node) = as_named_or_blank(item) else { continue };
            if let Some(constraint) = parse_constraint(graph, item_node)? {
                options.push(constraint);
            }
        }
        if !options.is_empty() {
            shape.flag_disjunction = true;
            shape.constraints.push(ConstraintInput {
                options,
                ..ConstraintInput::default()
            });
        }
    }

    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::read_graph_from_string;

    #[test]
    fn parses_target_class_and_min_count_property() {
        let graph = read_graph_from_string(
            r#"
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            @prefix ex: <http://ex.org/> .
            ex:A a sh:NodeShape ;
                sh:targetClass ex:Person ;
                sh:property [ sh:path ex:p ; sh:minCount 1 ] .
            "#,
            "turtle",
        )
        .unwrap();
        let shapes = parse_graph(&graph).unwrap();
        assert_eq!(shapes.len(), 1);
        let shape = &shapes[0];
        assert_eq!(shape.id, "http://ex.org/A");
        assert!(shape.target_def.as_ref().unwrap().contains("http://ex.org/Person"));
        assert_eq!(shape.constraints.len(), 1);
        assert_eq!(shape.constraints[0].min, 1);
    }

    #[test]
    fn parses_shape_reference_via_sh_node() {
        let graph = read_graph_from_string(
            r#"
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            @prefix ex: <http://ex.org/> .
            ex:A a sh:NodeShape ;
                sh:targetClass ex:Person ;
                sh:property [ sh:path ex:p ; sh:minCount 1 ; sh:node ex:B ] .
            ex:B a sh:NodeShape ;
                sh:targetClass ex:Org .
            "#,
            "turtle",
        )
        .unwrap();
        let shapes = parse_graph(&graph).unwrap();
        let a = shapes.iter().find(|s| s.id == "http://ex.org/A").unwrap();
        assert_eq!(a.constraints[0].shape_ref.as_deref(), Some("http://ex.org/B"));
    }
}
