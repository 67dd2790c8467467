//! Structural pre-check of raw queries.
//!
//! The validator rejects the common malformed shapes with a specific error before any
//! tree is built. It is not a grammar: bracket balance is left to the tokenizer and the
//! tree builder.

use crate::{
    ast::OperatorKind,
    error::QueryFormatError,
    lexer::{Lexeme, LexemeKind, scan},
};

/// A lexeme reduced to the role it plays in operator and bracket placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// `(`
    Open,
    /// `)`
    Close,
    /// An operator, or a keyword that ends a condition value.
    Operator(OperatorKind),
    /// A condition with a usable value.
    Closed,
    /// A condition whose value is empty or only a keyword.
    Empty,
}

/// A shape and the byte position it was found at.
#[derive(Debug, Clone, Copy)]
struct Item {
    /// Role of the item.
    shape: Shape,
    /// Byte position in the query.
    position: usize,
}

/// Returns the operator keyword ending `value`, with its byte offset within `value`.
fn trailing_keyword(value: &str) -> Option<(OperatorKind, usize)> {
    let word = value.rsplit(|c: char| c.is_ascii_whitespace()).next()?;
    OperatorKind::from_keyword(word).map(|kind| (kind, value.len() - word.len()))
}

/// Reduces lexemes to shapes. Stray text is dropped.
///
/// A value ending in a keyword (`ti=a and`) contributes both a condition and an operator.
fn shapes(lexemes: &[Lexeme]) -> Vec<Item> {
    let mut items = Vec::with_capacity(lexemes.len());
    for lexeme in lexemes {
        let position = lexeme.span.start;
        match &lexeme.kind {
            LexemeKind::Open => items.push(Item {
                shape: Shape::Open,
                position,
            }),
            LexemeKind::Close => items.push(Item {
                shape: Shape::Close,
                position,
            }),
            LexemeKind::Operator(kind) => items.push(Item {
                shape: Shape::Operator(*kind),
                position,
            }),
            LexemeKind::Condition { value, .. } => match trailing_keyword(value) {
                Some((kind, offset)) => {
                    let value_start = lexeme.span.end - value.len();
                    let shape = if offset == 0 {
                        Shape::Empty
                    } else {
                        Shape::Closed
                    };
                    items.push(Item { shape, position });
                    items.push(Item {
                        shape: Shape::Operator(kind),
                        position: value_start + offset,
                    });
                }
                None => {
                    let shape = if value.is_empty() {
                        Shape::Empty
                    } else {
                        Shape::Closed
                    };
                    items.push(Item { shape, position });
                }
            },
            LexemeKind::Text(_) => {}
        }
    }
    items
}

/// Returns the first standalone operator keyword anywhere in the query.
fn first_keyword(query: &str) -> Option<(OperatorKind, usize)> {
    let mut start = 0;
    for (i, byte) in query.bytes().enumerate().chain([(query.len(), b' ')]) {
        if byte.is_ascii_whitespace() || byte == b'(' || byte == b')' {
            if let Some(kind) = OperatorKind::from_keyword(&query[start..i]) {
                return Some((kind, start));
            }
            start = i + 1;
        }
    }
    None
}

/// Every operator needs a closed operand on its left and must not sit before `)`.
fn check_operators(items: &[Item]) -> Result<(), QueryFormatError> {
    for (i, item) in items.iter().enumerate() {
        if let Shape::Operator(operator) = item.shape {
            let left_ok = i > 0 && matches!(items[i - 1].shape, Shape::Closed | Shape::Close);
            let before_close = items.get(i + 1).is_some_and(|n| n.shape == Shape::Close);
            if !left_ok || before_close {
                return Err(QueryFormatError::MisplacedOperator {
                    operator,
                    position: item.position,
                });
            }
        }
    }
    Ok(())
}

/// A lone condition must not be mixed with keywords, and nothing may end in an operator.
fn check_dangling(query: &str, lexemes: &[Lexeme], items: &[Item]) -> Result<(), QueryFormatError> {
    let condition_count = lexemes
        .iter()
        .filter(|l| matches!(l.kind, LexemeKind::Condition { .. }))
        .count();
    if condition_count == 1
        && let Some((operator, position)) = first_keyword(query)
    {
        return Err(QueryFormatError::DanglingOperator { operator, position });
    }
    if let Some(last) = items.last()
        && let Shape::Operator(operator) = last.shape
    {
        return Err(QueryFormatError::DanglingOperator {
            operator,
            position: last.position,
        });
    }
    Ok(())
}

/// Two operands may not follow each other directly.
fn check_adjacency(items: &[Item]) -> Result<(), QueryFormatError> {
    for pair in items.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        if matches!(prev.shape, Shape::Closed | Shape::Close)
            && matches!(cur.shape, Shape::Closed | Shape::Open)
        {
            return Err(QueryFormatError::MissingOperator {
                position: cur.position,
            });
        }
    }
    Ok(())
}

/// Rejects `()` and brackets directly after `=`.
fn check_brackets(items: &[Item]) -> Result<(), QueryFormatError> {
    for pair in items.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        match (prev.shape, cur.shape) {
            (Shape::Open, Shape::Close) => {
                return Err(QueryFormatError::BracketMisplacement {
                    position: prev.position,
                });
            }
            (Shape::Empty, Shape::Open | Shape::Close) => {
                return Err(QueryFormatError::BracketMisplacement {
                    position: cur.position,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Rejects empty values and stray text, in that order.
fn check_leftovers(lexemes: &[Lexeme]) -> Result<(), QueryFormatError> {
    for lexeme in lexemes {
        if let LexemeKind::Condition { field, value } = &lexeme.kind
            && value.is_empty()
        {
            return Err(QueryFormatError::MissingValue {
                field: field.clone(),
                position: lexeme.span.start,
            });
        }
    }
    for lexeme in lexemes {
        if let LexemeKind::Text(text) = &lexeme.kind {
            return Err(QueryFormatError::UnexpectedText {
                text: text.clone(),
                position: lexeme.span.start,
            });
        }
    }
    Ok(())
}

/// Validates the overall shape of a query.
///
/// Checks run in a fixed order and the first failure is returned:
/// no condition, misplaced operator, dangling operator, missing operator, misplaced
/// bracket, missing value and finally unexpected text. Passing validation does not
/// guarantee the query compiles; unbalanced brackets are caught later.
pub fn validate(query: &str) -> Result<(), QueryFormatError> {
    let lexemes = scan(query);
    let items = shapes(&lexemes);

    let has_condition = lexemes
        .iter()
        .any(|l| matches!(&l.kind, LexemeKind::Condition { value, .. } if !value.is_empty()));
    if !has_condition {
        return Err(QueryFormatError::NoCondition);
    }

    check_operators(&items)?;
    check_dangling(query, &lexemes, &items)?;
    check_adjacency(&items)?;
    check_brackets(&items)?;
    check_leftovers(&lexemes)
}
