//! fq: fielded boolean queries
//!
//! Searches a JSON corpus with queries such as `ti=network and (au=smith or au=jones)`.
//! Field codes map to record keys through `.fq.toml` configuration; queries are compiled
//! by `fq-query` and evaluated against an in-memory index built by `fq-index`.

#![warn(missing_docs)]

pub mod cli;
