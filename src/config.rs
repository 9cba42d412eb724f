//! Run configuration (`spec.md` §9's `Config` design note and the CLI
//! surface of §6). A plain record, never a named-kwarg constructor.

use std::path::PathBuf;

use crate::planner::traversal_planner::{DegreeHeuristic, GraphTraversal, Heuristics, PropertiesHeuristic};

/// Default query-split threshold (`-m`), matching `spec.md` §6.
pub const DEFAULT_QUERY_SPLIT_THRESHOLD: usize = 256;

#[derive(Debug, Clone)]
pub struct Config {
    pub schema_dir: PathBuf,
    pub endpoint: String,
    pub output_dir: PathBuf,
    pub graph_traversal: GraphTraversal,
    pub heuristics: Heuristics,
    pub selective: bool,
    pub order_by: bool,
    pub max_split_size: usize,
    pub save_outputs: bool,
    pub json: bool,
}

impl Config {
    pub fn new(schema_dir: PathBuf, endpoint: String, output_dir: PathBuf) -> Self {
        Config {
            schema_dir,
            endpoint,
            output_dir,
            graph_traversal: GraphTraversal::Bfs,
            heuristics: Heuristics::default(),
            selective: false,
            order_by: false,
            max_split_size: DEFAULT_QUERY_SPLIT_THRESHOLD,
            save_outputs: false,
            json: false,
        }
    }
}

/// Parses the free-combination `--heuristics TARGET|IN|OUT|INOUT|OUTIN|SMALL|BIG`
/// flag values into a `Heuristics` record.
pub fn parse_heuristics(values: &[String]) -> Heuristics {
    let mut heuristics = Heuristics::default();
    for value in values {
        match value.to_ascii_uppercase().as_str() {
            "TARGET" => heuristics.target = true,
            "IN" => heuristics.degree = DegreeHeuristic::In,
            "OUT" => heuristics.degree = DegreeHeuristic::Out,
            "INOUT" => heuristics.degree = DegreeHeuristic::InOut,
            "OUTIN" => heuristics.degree = DegreeHeuristic::OutIn,
            "SMALL" => heuristics.properties = PropertiesHeuristic::Small,
            "BIG" => heuristics.properties = PropertiesHeuristic::Big,
            other => log::warn!("ignoring unrecognized heuristic '{}'", other),
        }
    }
    heuristics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_heuristics_combines_independent_flags() {
        let heuristics = parse_heuristics(&["TARGET".to_string(), "SMALL".to_string()]);
        assert!(heuristics.target);
        assert_eq!(heuristics.properties, PropertiesHeuristic::Small);
        assert_eq!(heuristics.degree, DegreeHeuristic::None);
    }
}
