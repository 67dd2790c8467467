//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use fq_config::TOPIC_FIELD;
pub use fq_highlight::{dim, error, highlight_query, subheader, success, warning};
use fq_query::{DocSet, DocumentId, EvalStats, ExpressionNode, QueryError};
use serde::Serialize;

/// JSON output for `fq search`.
#[derive(Serialize)]
pub struct JsonSearchOutput<'a> {
    /// The query as given.
    pub query: &'a str,
    /// Canonical form of the query.
    pub canonical: String,
    /// Topic (`ts`) values queried, in source order.
    pub topics: Vec<&'a str>,
    /// Number of matching documents.
    pub total: usize,
    /// Matching document ids in ascending order, truncated to the limit.
    pub ids: Vec<DocumentId>,
    /// Whether `ids` was truncated.
    pub truncated: bool,
}

/// JSON description of a query error.
#[derive(Serialize)]
pub struct JsonQueryError {
    /// Error message without the caret rendering.
    pub message: String,
    /// Byte position in the query, when known.
    pub position: Option<usize>,
    /// Suggested fix, when one applies.
    pub hint: Option<&'static str>,
}

impl From<&QueryError> for JsonQueryError {
    fn from(err: &QueryError) -> Self {
        Self {
            message: err.message(),
            position: err.position(),
            hint: err.suggestion(),
        }
    }
}

/// JSON output for `fq check`.
#[derive(Serialize)]
pub struct JsonCheckOutput<'a> {
    /// The query as given.
    pub query: &'a str,
    /// Whether the query compiled.
    pub valid: bool,
    /// Fully bracketed canonical query, when valid.
    pub canonical: Option<String>,
    /// Tree depth, when valid.
    pub depth: Option<usize>,
    /// The error, when invalid.
    pub error: Option<JsonQueryError>,
}

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns at most `limit` ids from the set (all of them when `limit` is 0).
pub fn limited_ids(ids: &DocSet, limit: usize) -> Vec<DocumentId> {
    let take = if limit == 0 { ids.len() } else { limit };
    ids.iter().take(take).copied().collect()
}

/// Prints matching ids one per line, with a note on stderr when truncated.
pub fn print_ids(ids: &DocSet, limit: usize) {
    let shown = limited_ids(ids, limit);
    for id in &shown {
        println!("{id}");
    }
    let hidden = ids.len() - shown.len();
    if hidden > 0 {
        eprintln!(
            "{}",
            dim(&format!("... {hidden} more (use -n 0 to show all)"))
        );
    }
}

/// Prints a query error with caret and hint on stderr.
pub fn print_query_error(err: &QueryError) {
    eprintln!("{} {err}", error("error:"));
}

/// Prints the explanation of a compiled and evaluated query.
pub fn print_explain(query: &str, tree: &ExpressionNode, stats: EvalStats, total: usize) {
    println!("{}", subheader("Query:"));
    println!("   {}", highlight_query(query));
    println!();

    println!("{}", subheader("Canonical:"));
    println!("   {}", highlight_query(&tree.to_query_string()));
    println!();

    let topics = tree.values_for(TOPIC_FIELD);
    if !topics.is_empty() {
        println!("{}", subheader("Topics:"));
        for topic in topics {
            println!("   {topic}");
        }
        println!();
    }

    println!("{}", subheader("Expression tree:"));
    for line in tree.to_string().lines() {
        println!("   {line}");
    }
    println!();

    println!("{}", subheader("Evaluation:"));
    println!("   Lookups:    {}", stats.lookups);
    println!("   Operators:  {}", stats.operators);
    println!("   Matches:    {total}");
}
