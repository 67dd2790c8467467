//! Implementation of `fq search`.

use std::process::ExitCode;

use fq_config::TOPIC_FIELD;
use fq_query::{Evaluator, QueryError, compile};
use tracing::info;

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{
        JsonSearchOutput, dim, limited_ids, print_explain, print_ids, print_json,
        print_query_error,
    },
};

/// Evaluates the query against the corpus and prints matching document ids.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let tree = match compile(&cmd.query) {
        Ok(tree) => tree,
        Err(e) => {
            print_query_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let index = match ctx.open_index(cmd.corpus.as_deref()) {
        Ok(index) => index,
        Err(code) => return code,
    };

    let evaluator = Evaluator::new(&index);
    let result = if ctx.config.search.parallel {
        evaluator.evaluate_parallel(&tree)
    } else {
        evaluator.evaluate(&tree)
    };
    let ids = match result {
        Ok(ids) => ids,
        Err(e) => {
            print_query_error(&QueryError::from(e).with_query(&cmd.query));
            return ExitCode::FAILURE;
        }
    };
    let stats = evaluator.stats();
    info!(
        matches = ids.len(),
        lookups = stats.lookups,
        "search complete"
    );

    if cmd.explain {
        print_explain(&cmd.query, &tree, stats, ids.len());
        return ExitCode::SUCCESS;
    }

    let limit = cmd.limit.unwrap_or(ctx.config.search.limit);

    if cmd.json {
        let shown = limited_ids(&ids, limit);
        return print_json(&JsonSearchOutput {
            query: &cmd.query,
            canonical: tree.to_query_string(),
            topics: tree.values_for(TOPIC_FIELD),
            total: ids.len(),
            truncated: shown.len() < ids.len(),
            ids: shown,
        });
    }

    if ids.is_empty() {
        eprintln!("{}", dim("No matching documents."));
        return ExitCode::SUCCESS;
    }

    print_ids(&ids, limit);
    ExitCode::SUCCESS
}
