//! Implementation of `fq check`.

use std::process::ExitCode;

use fq_query::compile;

use crate::cli::{
    args::CheckCommand,
    output::{
        JsonCheckOutput, JsonQueryError, highlight_query, print_json, print_query_error,
        subheader, success,
    },
};

/// Validates and compiles a query without evaluating it.
///
/// Exits with failure when the query does not compile.
pub fn run(cmd: &CheckCommand) -> ExitCode {
    let compiled = compile(&cmd.query);

    if cmd.json {
        let output = match &compiled {
            Ok(tree) => JsonCheckOutput {
                query: &cmd.query,
                valid: true,
                canonical: Some(tree.to_query_string()),
                depth: Some(tree.depth()),
                error: None,
            },
            Err(e) => JsonCheckOutput {
                query: &cmd.query,
                valid: false,
                canonical: None,
                depth: None,
                error: Some(JsonQueryError::from(e)),
            },
        };
        let code = print_json(&output);
        return if compiled.is_ok() {
            code
        } else {
            ExitCode::FAILURE
        };
    }

    match compiled {
        Ok(tree) => {
            println!("{}", success("Query is valid."));
            println!();
            println!("{}", subheader("Canonical:"));
            println!("   {}", highlight_query(&tree.to_query_string()));
            println!();
            println!("{}", subheader("Expression tree:"));
            for line in tree.to_string().lines() {
                println!("   {line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_query_error(&e);
            ExitCode::FAILURE
        }
    }
}
