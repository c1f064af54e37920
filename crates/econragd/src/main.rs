//! Command line entry points for the econrag abstract corpus.
//!
//! Each stage of the pipeline is a run-to-completion command that reads the
//! previous stage's output from the data directory:
//!
//! ```bash
//! # Fetch Crossref metadata into the response cache (resumable)
//! USER_EMAIL=me@example.org econrag harvest --start-year 2015
//!
//! # Replay the cache into the cleaned article table
//! econrag normalize
//!
//! # Embed every article
//! econrag embed --batch-size 64
//!
//! # Nearest-neighbour lookup
//! econrag query "minimum wage employment effects" -k 5
//!
//! # Cache maintenance
//! econrag keys
//! econrag clear
//! ```
//!
//! Logging goes to stderr; raise its level with `-v` (repeatable) or
//! `RUST_LOG`.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{path::PathBuf, process::ExitCode};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use econrag::{cache::SqliteCache, prelude::*, Config};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;

use crate::{commands::*, error::*};

/// Prefix for information messages
static INFO_PREFIX: &str = "ℹ ";
/// Prefix for in-progress messages
static WORKING_PREFIX: &str = "» ";
/// Prefix for success messages
static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
static WARNING_PREFIX: &str = "! ";
/// Prefix for error messages
static ERROR_PREFIX: &str = "✗ ";
/// Prefix for list items
static ITEM_PREFIX: &str = "├─";

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Harvest, clean, embed and query journal abstracts")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv, -vvvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Configuration file. Defaults to `config.toml` under the platform config
  /// directory, when present.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// Directory holding the response cache and artifacts
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// Resolves the configuration, applying command line overrides last.
  fn load_config(&self) -> Result<Config> {
    let mut config = Config::load(self.config.as_deref())?;
    if let Some(data_dir) = &self.data_dir {
      config.data_dir = data_dir.clone();
    }
    debug!("Using configuration {:?}", config);
    Ok(config)
  }
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Entry point for the econrag CLI application
#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  match run(&cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{} {}", style(ERROR_PREFIX).red(), e);
      ExitCode::FAILURE
    },
  }
}

/// Dispatches the parsed command.
async fn run(cli: &Cli) -> Result<()> {
  let config = cli.load_config()?;
  match cli.command.clone() {
    Commands::Harvest(options) => harvest(&config, options).await,
    Commands::Normalize => normalize(&config).await,
    Commands::Embed(options) => embed(&config, options).await,
    Commands::Query(options) => query(&config, options).await,
    Commands::Keys => keys(&config).await,
    Commands::Clear => clear(&config, cli.accept_defaults).await,
  }
}
