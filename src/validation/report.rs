//! The persisted validation report: a conformance document naming
//! `sh:focusNode`/`sh:sourceShape` per violation (`spec.md` §6.4).
//!
//! Scoped down from the teacher's `validation::report::ValidationReport`,
//! which also carries severities, messages, and nested detail results for
//! the full SHACL-core constraint catalog — this constraint model only ever
//! produces a focus node and a source shape per violation.

use std::fmt;

use oxigraph::io::RdfFormat;
use oxigraph::model::{BlankNode, Graph, Literal, NamedNode, Triple};

use crate::err::{Result, ShaclError};
use crate::model::shape::Schema;
use crate::rdf::serialize_graph_to_string;
use crate::vocab::sh;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub focus_node: String,
    pub source_shape: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub conforms: bool,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// Builds the report from every shape's registered violations, after
    /// validation has completed.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut results = Vec::new();
        for shape in schema.iter() {
            for target in &shape.targets.violated {
                results.push(ValidationResult {
                    focus_node: target.clone(),
                    source_shape: shape.name.clone(),
                });
            }
        }
        ValidationReport {
            conforms: results.is_empty(),
            results,
        }
    }

    fn named_node(iri: &str) -> Result<NamedNode> {
        NamedNode::new(iri).map_err(|e| ShaclError::Io(format!("invalid IRI '{}': {}", iri, e)))
    }

    pub fn to_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        let report_node = BlankNode::default();

        graph.insert(&Triple::new(
            report_node.clone(),
            sh::CONFORMS.into_owned(),
            Literal::from(self.conforms),
        ));

        for result in &self.results {
            let result_node = BlankNode::default();
            graph.insert(&Triple::new(
                report_node.clone(),
                sh::RESULT.into_owned(),
                result_node.clone(),
            ));
            graph.insert(&Triple::new(
                result_node.clone(),
                sh::RESULT_SEVERITY.into_owned(),
                sh::VIOLATION.into_owned(),
            ));
            graph.insert(&Triple::new(
                result_node.clone(),
                sh::FOCUS_NODE.into_owned(),
                Self::named_node(&result.focus_node)?,
            ));
            graph.insert(&Triple::new(
                result_node,
                sh::SOURCE_SHAPE.into_owned(),
                Self::named_node(&result.source_shape)?,
            ));
        }

        Ok(graph)
    }

    pub fn to_turtle(&self) -> Result<String> {
        serialize_graph_to_string(&self.to_graph()?, RdfFormat::Turtle)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(80))?;
        writeln!(
            f,
            "Validation report: {} ({} violation(s))",
            if self.conforms { "conforms" } else { "does not conform" },
            self.results.len()
        )?;
        for result in &self.results {
            writeln!(f, "  - {} violates {}", result.focus_node, result.source_shape)?;
        }
        write!(f, "{}", "=".repeat(80))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conforms_when_no_violations_registered() {
        let schema = Schema::new();
        let report = ValidationReport::from_schema(&schema);
        assert!(report.conforms);
        assert!(report.results.is_empty());
    }

    #[test]
    fn collects_one_result_per_violated_target() {
        let mut schema = Schema::new();
        let a = schema.insert("A");
        schema.get_mut(a).targets.register_violated("http://ex.org/a1");
        let report = ValidationReport::from_schema(&schema);
        assert!(!report.conforms);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].focus_node, "http://ex.org/a1");
    }
}
