//! Error types for the validation engine.

use std::fmt::{self, Display, Formatter};

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShaclError>;

/// Errors produced by the shape-schema boundary, the endpoint boundary, and
/// the validation engine itself.
#[derive(Debug)]
pub enum ShaclError {
    /// Shape directory not found, no shapes parsed, or a shape schema with
    /// contradictory constraints.
    Schema(String),
    /// Endpoint transport failure or malformed protocol response.
    Query(String),
    /// Internal invariant violated while generating a query (e.g. a shape
    /// reference with no path).
    Plan(String),
    /// Shape-file reading/parsing failure (the parsing boundary).
    Parse(String),
    /// Filesystem error.
    Io(String),
}

impl Display for ShaclError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ShaclError::Schema(e) => write!(f, "schema error: {}", e),
            ShaclError::Query(e) => write!(f, "query error: {}", e),
            ShaclError::Plan(e) => write!(f, "plan error: {}", e),
            ShaclError::Parse(e) => write!(f, "parse error: {}", e),
            ShaclError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ShaclError {}

impl From<std::io::Error> for ShaclError {
    fn from(e: std::io::Error) -> Self {
        ShaclError::Io(e.to_string())
    }
}
