//! Error types for query compilation and evaluation.
//!
//! Each stage has its own error type; [`QueryError`] unifies them for callers and renders
//! them with the query and a position indicator where one is known.

use std::{error::Error, fmt};

use thiserror::Error;

use crate::ast::OperatorKind;

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in the normalized input where the error occurred.
    pub position: usize,
    /// The normalized input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }

    /// Formats the error with a position indicator showing where the error occurred.
    pub fn format_with_context(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("query syntax error: {}\n", self.message));
        result.push_str(&format!("  {}\n", self.input));
        result.push_str(&format!("  {}^", " ".repeat(self.position)));
        result
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_context())
    }
}

impl Error for LexError {}

/// Structural problems found by the validator before a tree is built.
///
/// Positions are byte offsets into the query as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryFormatError {
    /// The query has no `field=value` condition.
    #[error("query contains no field condition")]
    NoCondition,

    /// An operator lacks a closed condition on its left or sits before `)`.
    #[error("misplaced operator {operator}")]
    MisplacedOperator {
        /// The offending operator.
        operator: OperatorKind,
        /// Byte position of the operator keyword.
        position: usize,
    },

    /// An operator with nothing to join, such as `ti=a and`.
    #[error("dangling operator {operator}")]
    DanglingOperator {
        /// The offending operator.
        operator: OperatorKind,
        /// Byte position of the operator keyword.
        position: usize,
    },

    /// Two operands follow each other without an operator.
    #[error("missing operator between conditions")]
    MissingOperator {
        /// Byte position of the second operand.
        position: usize,
    },

    /// A bracket in a position where it cannot group conditions.
    #[error("misplaced bracket")]
    BracketMisplacement {
        /// Byte position of the bracket.
        position: usize,
    },

    /// A field code with `=` but no value.
    #[error("field '{field}' has no value")]
    MissingValue {
        /// The field code.
        field: String,
        /// Byte position of the field code.
        position: usize,
    },

    /// Text that is neither a condition, an operator nor a bracket.
    #[error("unexpected text '{text}'")]
    UnexpectedText {
        /// The unrecognized text.
        text: String,
        /// Byte position of the text.
        position: usize,
    },
}

impl QueryFormatError {
    /// Returns the byte position of the problem, if it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::NoCondition => None,
            Self::MisplacedOperator { position, .. }
            | Self::DanglingOperator { position, .. }
            | Self::MissingOperator { position }
            | Self::BracketMisplacement { position }
            | Self::MissingValue { position, .. }
            | Self::UnexpectedText { position, .. } => Some(*position),
        }
    }
}

/// Tree-building failures.
///
/// The validator rejects the common malformed shapes; these are the backstop for
/// anything that gets past it. Token indices count the implicit outer `(` as 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Brackets do not pair up, or more than one tree is left over.
    #[error("unbalanced brackets (at token {token_index})")]
    UnbalancedStructure {
        /// Index of the token where the imbalance was detected.
        token_index: usize,
    },

    /// A `()` group with nothing inside.
    #[error("empty group (at token {token_index})")]
    EmptyGroup {
        /// Index of the closing bracket.
        token_index: usize,
    },

    /// An operator without a left or right operand.
    #[error("operator {operator} is missing an operand (at token {token_index})")]
    MissingOperand {
        /// The operator.
        operator: OperatorKind,
        /// Index of the operator token.
        token_index: usize,
    },

    /// Two operands in one group with no operator between them.
    #[error("operands without an operator between them (at token {token_index})")]
    AdjacentOperands {
        /// Index of the second operand's first token.
        token_index: usize,
    },
}

/// Failure reported by a [`FieldLookup`](crate::FieldLookup) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The index has no such field.
    #[error("unknown field code '{0}'")]
    UnknownField(String),

    /// The backing store failed.
    #[error("{0}")]
    Backend(String),
}

/// Evaluation failure. No partial results are produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A leaf lookup failed.
    #[error("lookup failed for {field}={value}: {source}")]
    LookupFailed {
        /// Field code of the failing condition.
        field: String,
        /// Value of the failing condition.
        value: String,
        /// What the lookup reported.
        #[source]
        source: LookupError,
    },
}

/// A unified error type for query compilation and evaluation.
///
/// This type provides detailed error messages with context, including
/// the original query string and position indicators where applicable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The query string the position refers to (if available).
    pub query: Option<String>,
}

/// The stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryErrorKind {
    /// Tokenization failed.
    #[error("{}", .0.message)]
    Lex(#[from] LexError),
    /// The validator rejected the query.
    #[error(transparent)]
    Format(#[from] QueryFormatError),
    /// The tree could not be built.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl QueryError {
    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Returns the byte position of the error within [`QueryError::query`], if known.
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            QueryErrorKind::Lex(err) => Some(err.position),
            QueryErrorKind::Format(err) => err.position(),
            QueryErrorKind::Parse(_) | QueryErrorKind::Eval(_) => None,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::Lex(err) if err.message.contains("closing bracket") => {
                Some("Remove the extra ')' or add a matching '('")
            }
            QueryErrorKind::Lex(err) if err.message.contains("no value") => {
                Some("Give the field a value, e.g. 'ti=network'")
            }
            QueryErrorKind::Format(err) => Some(match err {
                QueryFormatError::NoCondition => {
                    "Conditions look like 'ti=network': a two-letter lower-case field code, '=' and a value"
                }
                QueryFormatError::MisplacedOperator { .. } => {
                    "Operators join two conditions, e.g. 'ti=a AND au=b'; a query cannot start with NOT"
                }
                QueryFormatError::DanglingOperator { .. } => {
                    "Add a condition after the operator or remove it"
                }
                QueryFormatError::MissingOperator { .. } => {
                    "Join conditions with AND, OR or NOT"
                }
                QueryFormatError::BracketMisplacement { .. } => {
                    "Brackets group whole conditions, e.g. 'ti=a AND (au=b OR au=c)'"
                }
                QueryFormatError::MissingValue { .. } => {
                    "Give the field a value, e.g. 'ti=network'"
                }
                QueryFormatError::UnexpectedText { .. } => {
                    "Every term needs a field code, e.g. 'ti=network'"
                }
            }),
            QueryErrorKind::Parse(ParseError::UnbalancedStructure { .. }) => {
                Some("Add a closing bracket ) to match the opening one")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            QueryErrorKind::Eval(_) => "query error",
            _ => "query syntax error",
        };

        writeln!(f, "{}: {}", prefix, self.message())?;

        // If we have a query and position, show it with a pointer
        if let Some(query) = &self.query {
            writeln!(f, "  {}", query)?;
            if let Some(pos) = self.position() {
                let clamped = pos.min(query.len());
                writeln!(f, "  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {}", suggestion)?;
        }

        Ok(())
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        let query = Some(err.input.clone());
        Self {
            kind: QueryErrorKind::Lex(err),
            query,
        }
    }
}

impl From<QueryFormatError> for QueryError {
    fn from(err: QueryFormatError) -> Self {
        Self {
            kind: err.into(),
            query: None,
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: err.into(),
            query: None,
        }
    }
}

impl From<EvalError> for QueryError {
    fn from(err: EvalError) -> Self {
        Self {
            kind: err.into(),
            query: None,
        }
    }
}
