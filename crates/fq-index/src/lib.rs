//! In-memory search backend for fq queries.
//!
//! This crate loads a JSON corpus and builds an inverted index keyed by field code and
//! term. [`MemoryIndex`] implements [`fq_query::FieldLookup`], so compiled queries can be
//! evaluated against it directly:
//!
//! ```
//! use fq_index::{FieldMap, MemoryIndex, Record};
//! use fq_query::compile_and_evaluate;
//! use serde_json::json;
//!
//! let records: Vec<Record> = [
//!     json!({"id": 1, "title": "Graph networks"}),
//!     json!({"id": 2, "title": "Neural networks"}),
//! ]
//! .into_iter()
//! .filter_map(Record::from_value)
//! .collect();
//! let fields = FieldMap::from([("ti".to_string(), vec!["title".to_string()])]);
//! let index = MemoryIndex::build(&records, &fields);
//!
//! let hits = compile_and_evaluate("ti=networks not ti=graph", &index).unwrap();
//! assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec![2]);
//! ```

#![warn(missing_docs)]

mod analyzer;
mod corpus;
mod error;
mod index;

pub use analyzer::analyze;
pub use corpus::{Record, discover_files, load_corpus, load_file, parse_json, parse_jsonl};
pub use error::IndexError;
pub use index::{FieldMap, FieldStats, IndexStats, MemoryIndex};
