use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use travshacl::config::{Config, DEFAULT_QUERY_SPLIT_THRESHOLD};
use travshacl::endpoint::Endpoint;
use travshacl::err::ShaclError;
use travshacl::planner::traversal_planner::GraphTraversal;
use travshacl::validation::ValidationEngine;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TraversalArg {
    Bfs,
    Dfs,
}

impl From<TraversalArg> for GraphTraversal {
    fn from(value: TraversalArg) -> Self {
        match value {
            TraversalArg::Bfs => GraphTraversal::Bfs,
            TraversalArg::Dfs => GraphTraversal::Dfs,
        }
    }
}

/// Traversal-driven validation engine for shape-graph constraints over a
/// SPARQL-like endpoint.
#[derive(Parser)]
#[command(name = "travshacl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Shape directory.
    #[arg(short = 'd', long = "shapes", value_name = "PATH")]
    shapes_dir: PathBuf,

    /// Query-split threshold: the largest number of target IRIs bound via a
    /// single VALUES clause before the retrieval phase partitions further.
    #[arg(short = 'm', long = "max-split", default_value_t = DEFAULT_QUERY_SPLIT_THRESHOLD)]
    max_split: usize,

    /// SPARQL-protocol endpoint URL.
    #[arg(value_name = "ENDPOINT")]
    endpoint: String,

    /// Directory persisted outputs are written to (only used with --outputs).
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Graph traversal order.
    #[arg(value_enum, value_name = "BFS|DFS", default_value_t = TraversalArg::Bfs)]
    traversal: TraversalArg,

    /// Heuristics, freely combined: TARGET, IN, OUT, INOUT, OUTIN, SMALL, BIG.
    #[arg(long = "heuristics", value_delimiter = ',', num_args = 0..)]
    heuristics: Vec<String>,

    /// Enable neighbour-based filtering during target retrieval.
    #[arg(long)]
    selective: bool,

    /// Emit `ORDER BY ?x` on generated target queries.
    #[arg(long)]
    orderby: bool,

    /// Write classified targets, stats, and the validation report to
    /// `output_dir`.
    #[arg(long)]
    outputs: bool,

    /// Read shapes in the legacy JSON form instead of the RDF form.
    #[arg(long)]
    json: bool,

    /// Verbosity: repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), ShaclError> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    debug!("loading shapes from {}", cli.shapes_dir.display());
    let mut schema = travshacl::parser::load_schema_dir(&cli.shapes_dir, cli.json)?;
    info!("loaded {} shape(s)", schema.len());
    if cli.orderby {
        for id in schema.ids().collect::<Vec<_>>() {
            schema.get_mut(id).order_by = true;
        }
    }

    let mut config = Config::new(cli.shapes_dir.clone(), cli.endpoint.clone(), cli.output_dir.clone());
    config.graph_traversal = cli.traversal.into();
    config.heuristics = travshacl::config::parse_heuristics(&cli.heuristics);
    config.selective = cli.selective;
    config.order_by = cli.orderby;
    config.max_split_size = cli.max_split;
    config.save_outputs = cli.outputs;
    config.json = cli.json;

    let endpoint = Endpoint::remote(cli.endpoint.clone(), None)?;

    let bar = ProgressBar::new(schema.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .map_err(|e| ShaclError::Io(format!("failed to configure progress bar style: {}", e)))?
            .progress_chars("##-"),
    );
    bar.set_message("validating shapes");

    let mut engine = ValidationEngine::new(schema, endpoint, config.clone());
    let report = engine.exec()?;
    bar.finish_with_message("validation complete");

    println!("{}", report);

    if config.save_outputs {
        write_outputs(&config, &engine, &report)?;
    }

    Ok(())
}

fn write_outputs(
    config: &Config,
    engine: &ValidationEngine,
    report: &travshacl::ValidationReport,
) -> Result<(), ShaclError> {
    let mut valid = String::new();
    let mut violated = String::new();
    for shape in engine.schema().iter() {
        for target in &shape.targets.valid {
            valid.push_str(target);
            valid.push('\n');
        }
        for target in &shape.targets.violated {
            violated.push_str(target);
            violated.push('\n');
        }
    }

    travshacl::io::write_file(&config.output_dir, "targets_valid.log", &valid)?;
    travshacl::io::write_file(&config.output_dir, "targets_violated.log", &violated)?;
    travshacl::io::write_file(&config.output_dir, "stats.txt", &engine.stats().write_all_stats())?;
    travshacl::io::write_file(&config.output_dir, "traces.csv", &engine.stats().write_trace_csv())?;
    travshacl::io::write_file(&config.output_dir, "validationReport.ttl", &report.to_turtle()?)?;
    info!("outputs written to {}", config.output_dir.display());
    Ok(())
}
