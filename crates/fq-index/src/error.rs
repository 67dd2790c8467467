//! Error types for the fq-index crate.

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors that can occur while loading a corpus.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to read a corpus file or directory.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A corpus file is not valid JSON.
    #[error("invalid JSON in {}: {source}", location(path, *line))]
    Json {
        /// File containing the error.
        path: PathBuf,
        /// Line number for JSON-lines files.
        line: Option<usize>,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A record has no non-negative integer `id`.
    #[error("record without an integer id in {}", location(path, *line))]
    MissingId {
        /// File containing the record.
        path: PathBuf,
        /// Line number for JSON-lines files.
        line: Option<usize>,
    },

    /// A JSON document is neither a record nor an array of records.
    #[error("expected an object or an array of objects in {}", path.display())]
    NotRecords {
        /// File containing the document.
        path: PathBuf,
    },
}

/// Formats a path with an optional line number.
fn location(path: &Path, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("{}:{line}", path.display()),
        None => path.display().to_string(),
    }
}
