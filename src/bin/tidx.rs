//! CLI entry point for the `tidx` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use temporal_index::cli::commands;
use temporal_index::index::Range;
use temporal_index::{IndexConfig, TemporalError, TemporalResult, MAX_TIME, MIN_TIME};

#[derive(Parser)]
#[command(
    name = "tidx",
    about = "Temporal index CLI: store node extents and run interval-algebra queries"
)]
struct Cli {
    /// Index root directory (the store lives in <dir>/temporal)
    dir: PathBuf,

    /// Output format: "text" (default) or "json"
    #[arg(long, default_value = "text")]
    format: String,

    /// JSON file with index configuration (indexType, alwaysUseFirst, allowUnbound)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Always scan by start and evaluate one-bound relations by full scan
    #[arg(long)]
    always_use_first: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an extent for a node (omit END for an instant)
    Add {
        /// Node IRI, or _:label for a blank node
        node: String,
        /// Start: epoch millis or xsd:dateTime
        start: String,
        /// End: epoch millis or xsd:dateTime
        end: Option<String>,
    },
    /// Store an extent given as a dateTime or interval literal ("start, end")
    AddLiteral {
        /// Node IRI, or _:label for a blank node
        node: String,
        /// Literal lexical form
        literal: String,
    },
    /// Remove a node's extent
    Remove {
        /// Node IRI, or _:label for a blank node
        node: String,
    },
    /// Look up a node's extent
    Find {
        /// Node IRI, or _:label for a blank node
        node: String,
    },
    /// List stored records, optionally inside a box
    Scan {
        #[arg(long)]
        start_lo: Option<String>,
        #[arg(long)]
        start_hi: Option<String>,
        #[arg(long)]
        end_lo: Option<String>,
        #[arg(long)]
        end_hi: Option<String>,
        /// Maximum records to print
        #[arg(long, default_value = "100")]
        limit: usize,
    },
    /// Find nodes related to a stored node
    Query {
        /// Relation name, e.g. intervalOverlaps, or its full IRI
        relation: String,
        /// The bound node (second argument unless --inverse)
        node: String,
        /// Bind the first argument instead of the second
        #[arg(long)]
        inverse: bool,
        /// Maximum matches to print
        #[arg(long, default_value = "100")]
        limit: usize,
    },
    /// Print the optimizer estimate for a relation
    Estimate {
        /// Relation name or IRI
        relation: String,
        /// Bound node; omit for the unbound estimate
        node: Option<String>,
        /// Bind the first argument instead of the second
        #[arg(long)]
        inverse: bool,
    },
    /// Show record count and bounds
    Stats,
    /// Remove all records
    Clear,
    /// Delete the on-disk index
    Delete,
    /// List the supported relations
    Relations,
}

fn load_config(cli: &Cli) -> TemporalResult<IndexConfig> {
    let mut config = match &cli.config {
        Some(path) => IndexConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => IndexConfig::default(),
    };
    if cli.always_use_first {
        config.always_use_first = true;
    }
    Ok(config)
}

fn bound(arg: &Option<String>, default: i64) -> TemporalResult<i64> {
    match arg {
        Some(a) => commands::parse_time_arg(a),
        None => Ok(default),
    }
}

fn run(cli: Cli) -> TemporalResult<()> {
    let json = cli.format == "json";
    let config = load_config(&cli)?;
    let dir = cli.dir.as_path();

    match &cli.command {
        Commands::Add { node, start, end } => {
            commands::cmd_add(dir, config, node, start, end.as_deref(), json)
        }
        Commands::AddLiteral { node, literal } => {
            commands::cmd_add_literal(dir, config, node, literal, json)
        }
        Commands::Remove { node } => commands::cmd_remove(dir, config, node, json),
        Commands::Find { node } => commands::cmd_find(dir, config, node, json),
        Commands::Scan {
            start_lo,
            start_hi,
            end_lo,
            end_hi,
            limit,
        } => {
            let range = if start_lo.is_none()
                && start_hi.is_none()
                && end_lo.is_none()
                && end_hi.is_none()
            {
                None
            } else {
                Some(Range::new(
                    bound(start_lo, MIN_TIME)?,
                    bound(start_hi, MAX_TIME)?,
                    bound(end_lo, MIN_TIME)?,
                    bound(end_hi, MAX_TIME)?,
                ))
            };
            commands::cmd_scan(dir, config, range, *limit, json)
        }
        Commands::Query {
            relation,
            node,
            inverse,
            limit,
        } => commands::cmd_query(dir, config, relation, node, *inverse, *limit, json),
        Commands::Estimate {
            relation,
            node,
            inverse,
        } => commands::cmd_estimate(dir, config, relation, node.as_deref(), *inverse, json),
        Commands::Stats => commands::cmd_stats(dir, config, json),
        Commands::Clear => commands::cmd_clear(dir, config),
        Commands::Delete => commands::cmd_delete(dir, config),
        Commands::Relations => commands::cmd_relations(json),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        let code = match &e {
            TemporalError::Io(_) | TemporalError::Storage(_) => 1,
            TemporalError::InvalidConfig(_)
            | TemporalError::UnsupportedIndexType(_)
            | TemporalError::InvalidLiteral(_)
            | TemporalError::InvalidArgument(_) => 2,
            TemporalError::IndexClosed
            | TemporalError::IndexOpen
            | TemporalError::IteratorClosed
            | TemporalError::UnboundEvaluation(_) => 3,
            TemporalError::UnknownRelation(_) => 4,
        };
        process::exit(code);
    }
}
