//! The endpoint abstraction (`spec.md` §4.3/§9): a process-wide singleton
//! issuing query strings and returning an ordered, lazily-iterated sequence
//! of variable bindings, regardless of whether the queries run against a
//! remote SPARQL-protocol endpoint or a locally held graph.

pub mod memory;
pub mod remote;

use std::collections::HashMap;

use crate::err::Result;

/// A single query solution: variable name (no leading `?`) to its bound
/// value. Datatype/language metadata is ignored by the core, per `spec.md`
/// §6.
pub type Binding = HashMap<String, String>;

/// A finite, ordered, lazily-consumed sequence of bindings. Never collected
/// into a `Vec` by the engine except where it must buffer a `cnt` column.
pub type BindingStream = Box<dyn Iterator<Item = Binding>>;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// `Endpoint { Remote(..) | InMemory(..) }` per the design note in
/// `spec.md` §9. One `run_query` surface regardless of variant.
pub enum Endpoint {
    Remote(remote::RemoteEndpoint),
    InMemory(memory::MemoryEndpoint),
}

impl Endpoint {
    pub fn remote(url: impl Into<String>, credentials: Option<Credentials>) -> Result<Self> {
        Ok(Endpoint::Remote(remote::RemoteEndpoint::new(
            url.into(),
            credentials,
        )?))
    }

    pub fn in_memory(graph: oxigraph::model::Graph) -> Result<Self> {
        Ok(Endpoint::InMemory(memory::MemoryEndpoint::new(graph)?))
    }

    /// Issues `query` and returns its binding stream. A query failure is
    /// fatal and propagates (`spec.md` §4.6) — the engine never retries.
    pub fn run_query(&self, query: String) -> Result<BindingStream> {
        match self {
            Endpoint::Remote(endpoint) => endpoint.run_query(query),
            Endpoint::InMemory(endpoint) => endpoint.run_query(query),
        }
    }
}
