//! Clap argument definitions for the `fq` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Query syntax summary shown after `fq search --help` and `fq check --help`.
const QUERY_SYNTAX_HELP: &str = "\
QUERY SYNTAX:
  ti=value            Condition: two-letter field code, '=', value
  a AND b             Documents matching both
  a OR b              Documents matching either
  a NOT b             Documents matching a but not b
  (expr)              Grouping

  Operators are case-insensitive and share one precedence level, so a chain
  folds left to right: 'a or b and c' is '(a or b) and c'. An operator word
  inside a value is only an operator when a condition follows it.

EXAMPLES:
  fq search 'ti=network and (au=smith or au=jones)'
  fq search 'ts=deep learning not py=2020'
  fq search --explain 'ti=rock and roll or au=presley'
  fq check 'ti=a and or au=b'";

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "fq", version)]
#[command(about = "Fielded boolean queries over JSON corpora")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `fq search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query to evaluate
    pub query: String,

    /// Maximum document ids to print, 0 for all [default: 100]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Corpus file or directory, overriding the configured one
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show the canonical query, the expression tree and evaluation counters
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for `fq check`.
#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    /// Query to validate
    pub query: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `fq init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.fq.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `fq` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a query against the corpus and print matching document ids
    #[command(after_help = QUERY_SYNTAX_HELP)]
    Search(SearchCommand),

    /// Validate a query and show its expression tree
    #[command(after_help = QUERY_SYNTAX_HELP)]
    Check(CheckCommand),

    /// List configured field codes
    Fields,

    /// Initialize fq configuration in current directory
    Init(InitCommand),

    /// Show status and validate configuration
    Status,

    /// Show effective configuration settings
    Config,
}
