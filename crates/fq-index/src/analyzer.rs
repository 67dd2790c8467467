//! Text analysis shared by indexing and lookup.
//!
//! Text is split on every non-alphanumeric character and lower-cased. Overlong terms are
//! dropped.

/// Maximum term length in bytes before filtering.
const MAX_TERM_LENGTH: usize = 40;

/// Splits text into lower-case terms.
pub fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty() && term.len() <= MAX_TERM_LENGTH)
        .map(str::to_lowercase)
        .collect()
}
