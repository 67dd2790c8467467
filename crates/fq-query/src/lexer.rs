//! Query normalizer and tokenizer.
//!
//! A permissive scanner classifies the raw query into lexemes. The normalizer uses it to
//! rewrite the query into canonical form (no whitespace around brackets and `=`,
//! upper-case operators) and the tokenizer turns the canonical form into the token
//! sequence consumed by the tree builder.
//!
//! Operator keywords are only recognized where they cannot belong to a value: at the
//! start of the query or a group, and inside a value only when a field condition follows
//! them. `ti=rock and roll` is a single condition; `ti=rock and au=smith` is two.

use std::{fmt, ops::Range};

use crate::{ast::OperatorKind, error::LexError};

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Opening bracket.
    LParen,
    /// Closing bracket.
    RParen,
    /// Boolean operator keyword.
    Operator(OperatorKind),
    /// Field condition (`ti=network`).
    Condition {
        /// Two-letter field code.
        field: String,
        /// Value with surrounding whitespace removed.
        value: String,
    },
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Operator(kind) => write!(f, "{kind}"),
            Self::Condition { field, value } => write!(f, "{field}={value}"),
        }
    }
}

/// Classification of a slice of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexemeKind {
    /// `(`
    Open,
    /// `)`
    Close,
    /// An operator keyword outside any value.
    Operator(OperatorKind),
    /// A field condition; `value` may be empty.
    Condition {
        /// Two-letter field code.
        field: String,
        /// Trimmed value text.
        value: String,
    },
    /// Anything that is not part of a condition, operator or bracket.
    Text(String),
}

/// A classified slice of the query with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    /// What the slice is.
    pub kind: LexemeKind,
    /// Byte range in the scanned input.
    pub span: Range<usize>,
}

/// Permissive scanner over a query string.
struct Scanner<'a> {
    /// The input being scanned.
    input: &'a str,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for the given input.
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Scans the entire input.
    fn scan(mut self) -> Vec<Lexeme> {
        let mut lexemes = Vec::new();
        while let Some(lexeme) = self.next_lexeme() {
            lexemes.push(lexeme);
        }
        lexemes
    }

    /// Returns the next lexeme, or None at end of input.
    fn next_lexeme(&mut self) -> Option<Lexeme> {
        self.skip_whitespace();
        let start = self.position;
        let byte = *self.input.as_bytes().get(start)?;

        let (kind, end) = match byte {
            b'(' => (LexemeKind::Open, start + 1),
            b')' => (LexemeKind::Close, start + 1),
            _ => {
                if let Some(value_start) = field_start(self.input, start) {
                    self.read_condition(start, value_start)
                } else if let Some((kind, end)) = keyword_at(self.input, start) {
                    (LexemeKind::Operator(kind), end)
                } else {
                    self.read_text(start)
                }
            }
        };

        self.position = self.position.max(end);
        Some(Lexeme {
            kind,
            span: start..end,
        })
    }

    /// Reads a condition whose field code starts at `start`.
    fn read_condition(&mut self, start: usize, after_eq: usize) -> (LexemeKind, usize) {
        let field = &self.input[start..start + 2];
        let value_start = skip_whitespace_from(self.input, after_eq);
        let value_end = value_end(self.input, value_start);
        let value = self.input[value_start..value_end].trim_end();

        // Trailing whitespace is consumed but not part of the span.
        self.position = value_end;
        (
            LexemeKind::Condition {
                field: field.to_string(),
                value: value.to_string(),
            },
            value_start + value.len(),
        )
    }

    /// Reads a run of stray text up to the next delimiter.
    fn read_text(&self, start: usize) -> (LexemeKind, usize) {
        let bytes = self.input.as_bytes();
        let mut end = start;
        while end < bytes.len() && !is_delimiter(bytes[end]) {
            end += 1;
        }
        (LexemeKind::Text(self.input[start..end].to_string()), end)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        self.position = skip_whitespace_from(self.input, self.position);
    }
}

/// Whitespace and brackets separate words.
fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'(' || byte == b')'
}

/// True if `pos` is at the start of input or directly after a delimiter.
fn at_word_start(input: &str, pos: usize) -> bool {
    pos == 0 || input.as_bytes().get(pos - 1).is_some_and(|&b| is_delimiter(b))
}

/// Returns the first non-whitespace position at or after `pos`.
fn skip_whitespace_from(input: &str, mut pos: usize) -> usize {
    let bytes = input.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// If a field condition starts at `pos`, returns the position just past its `=`.
///
/// A field start is two lower-case ASCII letters at a word start, optionally followed
/// by whitespace, then `=`.
fn field_start(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if !at_word_start(input, pos) {
        return None;
    }
    let (first, second) = (*bytes.get(pos)?, *bytes.get(pos + 1)?);
    if !first.is_ascii_lowercase() || !second.is_ascii_lowercase() {
        return None;
    }
    let eq = skip_whitespace_from(input, pos + 2);
    (bytes.get(eq) == Some(&b'=')).then_some(eq + 1)
}

/// If a standalone operator keyword starts at `pos`, returns it and its end position.
fn keyword_at(input: &str, pos: usize) -> Option<(OperatorKind, usize)> {
    let bytes = input.as_bytes();
    if !at_word_start(input, pos) {
        return None;
    }
    let mut end = pos;
    while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }
    if end < bytes.len() && !is_delimiter(bytes[end]) {
        return None;
    }
    OperatorKind::from_keyword(&input[pos..end]).map(|kind| (kind, end))
}

/// Like [`keyword_at`], but only matches keywords followed by a field condition
/// (after optional whitespace and opening brackets).
fn targeted_operator_at(input: &str, pos: usize) -> Option<(OperatorKind, usize)> {
    let (kind, end) = keyword_at(input, pos)?;
    let bytes = input.as_bytes();
    let mut next = end;
    while next < bytes.len() && (bytes[next].is_ascii_whitespace() || bytes[next] == b'(') {
        next += 1;
    }
    field_start(input, next).map(|_| (kind, end))
}

/// Finds where a value starting at `from` ends.
///
/// Values stop at a bracket, at the start of another field condition, or at an operator
/// keyword that introduces another condition.
fn value_end(input: &str, from: usize) -> usize {
    let bytes = input.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte == b'(' || byte == b')' {
            break;
        }
        if field_start(input, pos).is_some() {
            break;
        }
        if pos > from
            && bytes[pos - 1].is_ascii_whitespace()
            && targeted_operator_at(input, pos).is_some()
        {
            break;
        }
        pos += 1;
    }
    pos
}

/// Scans a query into lexemes. Never fails; unrecognized input becomes
/// [`LexemeKind::Text`].
pub fn scan(input: &str) -> Vec<Lexeme> {
    Scanner::new(input).scan()
}

/// Removes whitespace runs adjacent to `(`, `)` or `=`, and trims the ends.
fn trim_structural_whitespace(input: &str) -> String {
    let is_structural = |c: char| matches!(c, '(' | ')' | '=');
    let mut out = String::with_capacity(input.len());
    let mut chars = input.trim().chars().peekable();

    while let Some(ch) = chars.next() {
        if !ch.is_whitespace() {
            out.push(ch);
            continue;
        }
        let mut run = String::from(ch);
        while let Some(&next) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            run.push(next);
            chars.next();
        }
        let before = out.chars().next_back().is_some_and(is_structural);
        let after = chars.peek().copied().is_some_and(is_structural);
        if !before && !after {
            out.push_str(&run);
        }
    }

    out
}

/// Rewrites a query into canonical form.
///
/// Whitespace next to `(`, `)` and `=` is removed and operator keywords are upper-cased.
/// Field values keep their casing and inner whitespace. Normalizing a canonical query
/// returns it unchanged.
pub fn normalize(query: &str) -> String {
    let trimmed = trim_structural_whitespace(query);
    let mut out = String::with_capacity(trimmed.len());
    let mut copied = 0;

    for lexeme in scan(&trimmed) {
        if let LexemeKind::Operator(kind) = lexeme.kind {
            out.push_str(&trimmed[copied..lexeme.span.start]);
            out.push_str(kind.keyword());
            copied = lexeme.span.end;
        }
    }
    out.push_str(&trimmed[copied..]);
    out
}

/// Tokenizes a query.
///
/// The query is normalized first, and the resulting tokens are wrapped in an implicit
/// outer bracket pair, so the sequence always starts with `(` and ends with `)`.
/// Error positions refer to the normalized query, which the error carries.
pub fn tokenize(query: &str) -> Result<Vec<Token>, LexError> {
    let canonical = normalize(query);
    let mut tokens = vec![Token::LParen];
    let mut depth = 0usize;

    for lexeme in scan(&canonical) {
        let position = lexeme.span.start;
        let token = match lexeme.kind {
            LexemeKind::Open => {
                depth += 1;
                Token::LParen
            }
            LexemeKind::Close => {
                if depth == 0 {
                    return Err(LexError::new(
                        "unmatched closing bracket",
                        position,
                        &canonical,
                    ));
                }
                depth -= 1;
                Token::RParen
            }
            LexemeKind::Operator(kind) => Token::Operator(kind),
            LexemeKind::Condition { field, value } => {
                if value.is_empty() {
                    return Err(LexError::new(
                        format!("unterminated condition: field '{field}' has no value"),
                        position,
                        &canonical,
                    ));
                }
                Token::Condition { field, value }
            }
            LexemeKind::Text(text) => {
                return Err(LexError::new(
                    format!("unexpected text '{text}'"),
                    position,
                    &canonical,
                ));
            }
        };
        tokens.push(token);
    }

    tokens.push(Token::RParen);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(field: &str, value: &str) -> Token {
        Token::Condition {
            field: field.into(),
            value: value.into(),
        }
    }

    fn kinds(input: &str) -> Vec<LexemeKind> {
        scan(input).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn single_condition() {
        assert_eq!(
            tokenize("ti=network").unwrap(),
            vec![Token::LParen, cond("ti", "network"), Token::RParen]
        );
    }

    #[test]
    fn whitespace_around_equals() {
        assert_eq!(
            tokenize("ti  =   network").unwrap(),
            vec![Token::LParen, cond("ti", "network"), Token::RParen]
        );
    }

    #[test]
    fn operators_any_case() {
        assert_eq!(
            tokenize("ti=a and au=b Or au=c NOT ts=2020").unwrap(),
            vec![
                Token::LParen,
                cond("ti", "a"),
                Token::Operator(OperatorKind::And),
                cond("au", "b"),
                Token::Operator(OperatorKind::Or),
                cond("au", "c"),
                Token::Operator(OperatorKind::Not),
                cond("ts", "2020"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn multi_word_value() {
        assert_eq!(
            tokenize("ti=Neural  Network and au=smith").unwrap(),
            vec![
                Token::LParen,
                cond("ti", "Neural  Network"),
                Token::Operator(OperatorKind::And),
                cond("au", "smith"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn keyword_inside_value_is_kept() {
        assert_eq!(
            tokenize("ti=rock and roll or au=smith").unwrap(),
            vec![
                Token::LParen,
                cond("ti", "rock and roll"),
                Token::Operator(OperatorKind::Or),
                cond("au", "smith"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn brackets() {
        assert_eq!(
            tokenize("ti=network and ( au=smith or au=jones )").unwrap(),
            vec![
                Token::LParen,
                cond("ti", "network"),
                Token::Operator(OperatorKind::And),
                Token::LParen,
                cond("au", "smith"),
                Token::Operator(OperatorKind::Or),
                cond("au", "jones"),
                Token::RParen,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn operator_after_group() {
        assert_eq!(
            tokenize("(ti=a or ti=b) not ts=2020").unwrap(),
            vec![
                Token::LParen,
                Token::LParen,
                cond("ti", "a"),
                Token::Operator(OperatorKind::Or),
                cond("ti", "b"),
                Token::RParen,
                Token::Operator(OperatorKind::Not),
                cond("ts", "2020"),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn unmatched_closing_bracket() {
        let err = tokenize("ti=a)").unwrap_err();
        assert!(err.message.contains("unmatched"));
        assert_eq!(err.position, 4);
    }

    #[test]
    fn empty_value_is_unterminated() {
        let err = tokenize("ti=").unwrap_err();
        assert!(err.message.contains("no value"));
        assert_eq!(err.position, 0);
    }

    #[test]
    fn stray_text() {
        let err = tokenize("foo ti=a").unwrap_err();
        assert!(err.message.contains("unexpected text 'foo'"));
    }

    #[test]
    fn field_after_empty_value() {
        assert_eq!(
            kinds("ti= au=b"),
            vec![
                LexemeKind::Condition {
                    field: "ti".into(),
                    value: String::new()
                },
                LexemeKind::Condition {
                    field: "au".into(),
                    value: "b".into()
                },
            ]
        );
    }

    #[test]
    fn upper_case_field_is_not_a_condition() {
        assert_eq!(kinds("TI=a"), vec![LexemeKind::Text("TI=a".into())]);
    }

    #[test]
    fn three_letter_code_is_not_a_condition() {
        assert_eq!(kinds("tit=a"), vec![LexemeKind::Text("tit=a".into())]);
    }

    #[test]
    fn scan_reports_spans() {
        let lexemes = scan("ti = a and (au=b)");
        let spans: Vec<_> = lexemes.iter().map(|l| l.span.clone()).collect();
        assert_eq!(spans, vec![0..6, 7..10, 11..12, 12..16, 16..17]);
    }

    #[test]
    fn scan_is_permissive() {
        assert_eq!(
            kinds("and ti= )"),
            vec![
                LexemeKind::Operator(OperatorKind::And),
                LexemeKind::Condition {
                    field: "ti".into(),
                    value: String::new()
                },
                LexemeKind::Close,
            ]
        );
    }

    #[test]
    fn normalize_canonical_spacing() {
        assert_eq!(
            normalize("  ti = network and ( au = smith or au=jones ) not ts = 2020 "),
            "ti=network AND(au=smith OR au=jones)NOT ts=2020"
        );
    }

    #[test]
    fn normalize_keeps_value_case() {
        assert_eq!(
            normalize("ti=Rock And Roll and au=McCartney"),
            "ti=Rock And Roll AND au=McCartney"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let queries = [
            "ti=network and (au=smith or au=jones) not ts=2020",
            "ti = a  and   au = b",
            "((ti=a or ti=b) and au=c)",
            "ti=rock and roll",
        ];
        for query in queries {
            let once = normalize(query);
            assert_eq!(normalize(&once), once, "not idempotent for {query:?}");
        }
    }

    #[test]
    fn canonical_query_normalizes_to_itself() {
        let canonical = "ti=network AND(au=smith OR au=jones)NOT ts=2020";
        assert_eq!(normalize(canonical), canonical);
        assert_eq!(
            tokenize(canonical).unwrap(),
            tokenize("ti=network and ( au=smith or au=jones ) not ts=2020").unwrap()
        );
    }

    #[test]
    fn token_display() {
        let rendered: Vec<String> = tokenize("ti=a and au=b")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["(", "ti=a", "AND", "au=b", ")"]);
    }
}
