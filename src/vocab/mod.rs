//! RDF vocabulary constants used by the RDF shape parser and report writer.

pub mod sh;
