//! Implementation of `fq status`.

use std::process::ExitCode;

use fq_config::{ConfigWarning, format_path_for_display};
use fq_index::MemoryIndex;

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Shows configuration files, corpus, index statistics and validation warnings.
///
/// Exits with failure when a configuration file exists and has warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let cwd = &ctx.cwd;
    let config = &ctx.config;

    if config.files.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!(
            "Run {} to create a configuration file.",
            subheader("fq init")
        );
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader("Config files:"));
    for path in &config.files {
        println!("   {}", format_path_for_display(path, Some(cwd)));
    }
    println!();

    println!("{}", subheader("Corpus:"));
    match &config.corpus {
        None => println!("   {}", dim("(not configured)")),
        Some(path) => {
            let display_path = format_path_for_display(path, Some(cwd));
            if path.exists() {
                println!("   {display_path}");
                print_index_stats(ctx);
            } else {
                println!("   {display_path} {}", warning("[missing]"));
            }
        }
    }
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Builds the index and prints document and term counts.
fn print_index_stats(ctx: &CommandContext) {
    let Some(path) = &ctx.config.corpus else {
        return;
    };
    match MemoryIndex::open(path, &ctx.config.field_map()) {
        Ok(index) => {
            let stats = index.stats();
            println!("   {}", dim(&format!("{} documents", stats.documents)));
            for field in &stats.fields {
                println!(
                    "   {} {}",
                    field.code,
                    dim(&format!("{} terms ({})", field.terms, field.keys.join(", ")))
                );
            }
        }
        Err(e) => println!("   {}", warning(&format!("failed to load: {e}"))),
    }
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints = Vec::new();
    for w in warnings {
        let hint = match w {
            ConfigWarning::CorpusNotConfigured => {
                "Hint: add a [corpus] section with a path to .fq.toml"
            }
            ConfigWarning::CorpusPathMissing { .. } => {
                "Hint: check the [corpus] path; relative paths resolve against the config file"
            }
            ConfigWarning::InvalidFieldCode { .. } => {
                "Hint: field codes are two lowercase letters, e.g. [fields.ti]"
            }
            ConfigWarning::FieldWithoutKeys { .. } => {
                "Hint: give the field keys = \"record_key\" or remove it"
            }
        };
        if !hints.contains(&hint) {
            hints.push(hint);
        }
    }
    for hint in hints {
        println!("{}", dim(hint));
    }
}
