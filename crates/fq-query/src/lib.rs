//! Fielded boolean query compiler and evaluator.
//!
//! Queries combine field conditions with boolean operators:
//!
//! - **Conditions**: `ti=neural network` - a two-letter field code, `=`, and a value
//! - **AND**: `ti=cancer and au=smith` - documents matching both
//! - **OR**: `au=smith or au=jones` - documents matching either
//! - **NOT**: `ti=cancer not ts=2020` - documents matching the left but not the right
//! - **Grouping**: `ti=cancer and (au=smith or au=jones)` - brackets control order
//!
//! Operators are case-insensitive and share one precedence level; a chain folds left to
//! right. Compilation runs the validator, the tokenizer and the tree builder in turn.
//! Evaluation resolves each condition through a [`FieldLookup`] and combines the
//! resulting document sets.
//!
//! # Example
//!
//! ```
//! use fq_query::{DocSet, LookupError, compile, evaluate};
//!
//! let tree = compile("ti=cancer and au=smith not ts=2020").unwrap();
//! let lookup = |field: &str, _value: &str| -> Result<DocSet, LookupError> {
//!     Ok(match field {
//!         "ti" => DocSet::from([1, 2, 3]),
//!         "au" => DocSet::from([2, 3, 4]),
//!         _ => DocSet::from([3]),
//!     })
//! };
//! assert_eq!(evaluate(&tree, &lookup).unwrap(), DocSet::from([2]));
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;
mod validate;

pub use ast::{ExpressionNode, OperatorKind};
pub use error::{
    EvalError, LexError, LookupError, ParseError, QueryError, QueryErrorKind, QueryFormatError,
};
pub use eval::{DocSet, DocumentId, EvalStats, Evaluator, FieldLookup, evaluate};
pub use lexer::{Lexeme, LexemeKind, Token, normalize, scan, tokenize};
pub use parser::build_tree;
pub use validate::validate;

/// Compiles a query into an expression tree.
///
/// The query is validated first; format errors carry the query as given. Tokenizer and
/// tree builder errors refer to the normalized query.
pub fn compile(query: &str) -> Result<ExpressionNode, QueryError> {
    validate(query).map_err(|e| QueryError::from(e).with_query(query))?;
    let tokens = tokenize(query)?;
    build_tree(&tokens).map_err(|e| QueryError::from(e).with_query(normalize(query)))
}

/// Compiles a query and evaluates it against `lookup`.
///
/// Any failure, at any stage, is returned as a single error and no partial result is
/// produced.
pub fn compile_and_evaluate<L: FieldLookup + ?Sized>(
    query: &str,
    lookup: &L,
) -> Result<DocSet, QueryError> {
    let tree = compile(query)?;
    evaluate(&tree, lookup).map_err(|e| QueryError::from(e).with_query(query))
}
