//! Command-line interface for the `fq` query tool.

use std::process::ExitCode;

use clap::Parser;
use fq::cli::{
    CommandContext,
    args::{Cli, Commands},
    commands, logging,
};

/// Parses arguments, loads configuration and runs the selected command.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match &cli.command {
        Commands::Init(_) => CommandContext::load_cwd_only(),
        _ => CommandContext::load(),
    };
    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    logging::init(cli.verbose, &ctx.config.log.level);
    commands::run(cli.command, &ctx)
}
