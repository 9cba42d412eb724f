//! The in-memory endpoint variant: queries a locally held graph with
//! oxigraph's own SPARQL engine instead of reimplementing path-element
//! resolution by hand. Grounded in the original's `engines/shacl2sparqlpy`
//! in-memory evaluation path, which exists for the same reason — running
//! the validation logic against a local graph without a network dependency.

use oxigraph::model::{Graph, GraphNameRef, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::endpoint::{Binding, BindingStream};
use crate::err::{Result, ShaclError};

pub struct MemoryEndpoint {
    store: Store,
}

impl MemoryEndpoint {
    pub fn new(graph: Graph) -> Result<Self> {
        let store = Store::new().map_err(|e| ShaclError::Query(format!("failed to build in-memory store: {}", e)))?;
        for triple in graph.iter() {
            store
                .insert(triple.in_graph(GraphNameRef::DefaultGraph))
                .map_err(|e| ShaclError::Query(format!("failed to load triple into store: {}", e)))?;
        }
        Ok(MemoryEndpoint { store })
    }

    pub fn run_query(&self, query: String) -> Result<BindingStream> {
        let results = self
            .store
            .query(&query)
            .map_err(|e| ShaclError::Query(format!("invalid SPARQL query: {}", e)))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let rows = solutions
                    .filter_map(|solution| solution.ok())
                    .map(|solution| {
                        solution
                            .iter()
                            .map(|(var, term)| (var.as_str().to_string(), term_to_string(term)))
                            .collect::<Binding>()
                    })
                    .collect::<Vec<_>>();
                Ok(Box::new(rows.into_iter()))
            }
            QueryResults::Boolean(value) => {
                let rows: Vec<Binding> = if value { vec![Binding::new()] } else { Vec::new() };
                Ok(Box::new(rows.into_iter()))
            }
            QueryResults::Graph(_) => Err(ShaclError::Query(
                "CONSTRUCT/DESCRIBE queries are not supported by the engine".to_string(),
            )),
        }
    }
}

fn term_to_string(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}
