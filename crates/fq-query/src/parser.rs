//! Tree builder.
//!
//! Folds a token sequence into an [`ExpressionNode`] with a single explicit stack.
//! Brackets push a sentinel; a closing bracket drains the stack back to its sentinel and
//! folds the drained run left to right, so operators in one group associate to the left:
//!
//! ```text
//! c1 op1 c2 op2 c3   →   ((c1 op1 c2) op2 c3)
//! ```
//!
//! All operators have equal precedence. Brackets are the only way to group.

use tracing::trace;

use crate::{
    ast::{ExpressionNode, OperatorKind},
    error::ParseError,
    lexer::Token,
};

/// An entry on the builder stack. Indices are token positions, kept for errors.
#[derive(Debug)]
enum StackEntry {
    /// An open group awaiting its `)`.
    Open,
    /// An operator awaiting its right operand.
    Pending(OperatorKind, usize),
    /// A finished sub-tree.
    Node(ExpressionNode, usize),
}

/// Stack machine that builds the tree.
struct TreeBuilder {
    /// Partially built entries, innermost group on top.
    stack: Vec<StackEntry>,
}

impl TreeBuilder {
    /// Creates an empty builder.
    fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Consumes one token.
    fn push(&mut self, token: &Token, index: usize) -> Result<(), ParseError> {
        match token {
            Token::LParen => self.stack.push(StackEntry::Open),
            Token::Operator(kind) => self.stack.push(StackEntry::Pending(*kind, index)),
            Token::Condition { field, value } => self.stack.push(StackEntry::Node(
                ExpressionNode::condition(field.as_str(), value.as_str()),
                index,
            )),
            Token::RParen => self.close_group(index)?,
        }
        Ok(())
    }

    /// Drains the stack back to the nearest [`StackEntry::Open`] and pushes the folded group.
    fn close_group(&mut self, index: usize) -> Result<(), ParseError> {
        let mut group = Vec::new();
        loop {
            match self.stack.pop() {
                Some(StackEntry::Open) => break,
                Some(entry) => group.push(entry),
                None => return Err(ParseError::UnbalancedStructure { token_index: index }),
            }
        }
        group.reverse();

        let (node, first) = fold_group(group, index)?;
        self.stack.push(StackEntry::Node(node, first));
        Ok(())
    }

    /// Returns the root once every token has been consumed.
    fn finish(mut self, token_count: usize) -> Result<ExpressionNode, ParseError> {
        match (self.stack.pop(), self.stack.is_empty()) {
            (Some(StackEntry::Node(root, _)), true) => Ok(root),
            _ => Err(ParseError::UnbalancedStructure {
                token_index: token_count,
            }),
        }
    }
}

/// Folds the contents of one group, in source order, into a single node.
///
/// Returns the node and the token index of its first operand.
fn fold_group(
    group: Vec<StackEntry>,
    close_index: usize,
) -> Result<(ExpressionNode, usize), ParseError> {
    let mut entries = group.into_iter();

    let (mut acc, first) = match entries.next() {
        None => {
            return Err(ParseError::EmptyGroup {
                token_index: close_index,
            });
        }
        Some(StackEntry::Node(node, index)) => (node, index),
        Some(StackEntry::Pending(operator, token_index)) => {
            return Err(ParseError::MissingOperand {
                operator,
                token_index,
            });
        }
        Some(StackEntry::Open) => {
            return Err(ParseError::UnbalancedStructure {
                token_index: close_index,
            });
        }
    };

    while let Some(entry) = entries.next() {
        let (operator, op_index) = match entry {
            StackEntry::Pending(operator, index) => (operator, index),
            StackEntry::Node(_, index) => {
                return Err(ParseError::AdjacentOperands { token_index: index });
            }
            StackEntry::Open => {
                return Err(ParseError::UnbalancedStructure {
                    token_index: close_index,
                });
            }
        };
        let Some(StackEntry::Node(right, _)) = entries.next() else {
            return Err(ParseError::MissingOperand {
                operator,
                token_index: op_index,
            });
        };
        trace!(%operator, token = op_index, "fold");
        acc = ExpressionNode::operator(operator, acc, right);
    }

    Ok((acc, first))
}

/// Builds an expression tree from a token sequence.
///
/// The sequence is expected to come from [`tokenize`](crate::tokenize), which wraps the
/// query in an outer bracket pair; the root is produced by the final `)`. Exactly one
/// node must remain once every token is consumed.
pub fn build_tree(tokens: &[Token]) -> Result<ExpressionNode, ParseError> {
    let mut builder = TreeBuilder::new();
    for (index, token) in tokens.iter().enumerate() {
        builder.push(token, index)?;
    }
    builder.finish(tokens.len())
}
