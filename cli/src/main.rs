//! resquery CLI - Main entry point
//!
//! Loads a schema description and shows how selectors resolve and how URL
//! queries compile against it.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use resquery_cli::config::Config;
use resquery_cli::error::CliError;

/// resquery - selector resolution and URL filters for resources
#[derive(Parser, Debug)]
#[command(name = "resquery")]
#[command(author, version, about = "Selector resolution and URL filters for resources", long_about = None)]
struct Cli {
    /// Path to config file (default: resquery.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log resolution and dropped filters to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
enum Command {
    /// Show the column and joins each selector resolves to
    Resolve {
        /// Resource table
        table: String,

        /// Field selectors, e.g. `organisation_id$name`
        #[arg(required = true)]
        selectors: Vec<String>,
    },

    /// Compile a URL query into a query plan
    Explain {
        /// Resource table
        table: String,

        /// URL or query string carrying the filters
        #[arg(short, long, value_name = "URLQUERY")]
        query: Option<String>,

        /// List field to select (repeatable)
        #[arg(short, long = "field", value_name = "SELECTOR")]
        fields: Vec<String>,

        /// Show the values of this field the query permits
        #[arg(long, value_name = "SELECTOR")]
        axis: Option<String>,
    },

    /// Normalize a URL query through the filters it parses to
    Url {
        /// Resource table
        table: String,

        /// URL or query string
        query: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug output with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "resquery_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;
    let schema = config.schema()?;

    match cli.command {
        Command::Resolve { table, selectors } => {
            resquery_cli::commands::resolve::run(&schema, &table, &selectors)
        }
        Command::Explain {
            table,
            query,
            fields,
            axis,
        } => resquery_cli::commands::explain::run(
            &schema,
            &table,
            query.as_deref(),
            &fields,
            axis.as_deref(),
        ),
        Command::Url { table, query } => {
            resquery_cli::commands::url::run(&schema, &table, &query, cli.verbose)
        }
    }
}

/// Load configuration with fallback to default path
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config, CliError> {
    match custom_path {
        Some(path) => Config::load_from(path).map_err(Into::into),
        None => Config::load().map_err(Into::into),
    }
}
