//! Query expression tree.
//!
//! A compiled query is a strictly binary tree: leaves are field conditions and every
//! internal node is a boolean operator with both operands present.
//!
//! Operator chains fold into left-deep trees as deep as the chain is long, so every
//! walk over a tree here (including drop, clone and equality) uses an explicit stack.

use std::{convert::Infallible, fmt, mem};

/// A boolean operator joining two sub-expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Intersection: documents matched by both operands.
    And,
    /// Union: documents matched by either operand.
    Or,
    /// Difference: documents matched by the left operand but not the right.
    Not,
}

impl OperatorKind {
    /// Parses an operator keyword, ignoring ASCII case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("AND") {
            Some(Self::And)
        } else if word.eq_ignore_ascii_case("OR") {
            Some(Self::Or)
        } else if word.eq_ignore_ascii_case("NOT") {
            Some(Self::Not)
        } else {
            None
        }
    }

    /// Returns the canonical (upper-case) keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A node of a compiled query.
#[derive(Debug, Eq)]
pub enum ExpressionNode {
    /// Leaf: documents whose `field` matches `value`.
    Condition {
        /// Two-letter field code (e.g. `ti`).
        field: String,
        /// Value to look up, with its original casing.
        value: String,
    },

    /// Internal node combining the results of two sub-trees.
    Operator {
        /// How the operand results are combined.
        kind: OperatorKind,
        /// Left operand (the minuend for `NOT`).
        left: Box<Self>,
        /// Right operand (the subtrahend for `NOT`).
        right: Box<Self>,
    },
}

impl ExpressionNode {
    /// Creates a condition leaf.
    pub fn condition(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Condition {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an operator node.
    pub fn operator(kind: OperatorKind, left: Self, right: Self) -> Self {
        Self::Operator {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates an `AND` node.
    pub fn and(left: Self, right: Self) -> Self {
        Self::operator(OperatorKind::And, left, right)
    }

    /// Creates an `OR` node.
    pub fn or(left: Self, right: Self) -> Self {
        Self::operator(OperatorKind::Or, left, right)
    }

    /// Creates a `NOT` (difference) node.
    pub fn not(left: Self, right: Self) -> Self {
        Self::operator(OperatorKind::Not, left, right)
    }

    /// Returns the `(field, value)` pairs of all leaves, in source order.
    pub fn conditions(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Condition { field, value } => out.push((field.as_str(), value.as_str())),
                Self::Operator { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        out
    }

    /// Returns every value queried for the given field code, in source order.
    ///
    /// Used to pull out the `ts` topic values of a query, e.g. to report which topics
    /// a search touched.
    pub fn values_for(&self, field: &str) -> Vec<&str> {
        self.conditions()
            .into_iter()
            .filter(|(f, _)| *f == field)
            .map(|(_, v)| v)
            .collect()
    }

    /// Folds the tree bottom-up.
    ///
    /// `leaf` is called for every condition from left to right, and `combine` for every
    /// operator once both of its operands are folded. The first error stops the fold.
    pub fn try_fold<'t, T, E>(
        &'t self,
        mut leaf: impl FnMut(&'t str, &'t str) -> Result<T, E>,
        mut combine: impl FnMut(OperatorKind, T, T) -> Result<T, E>,
    ) -> Result<T, E> {
        /// Work left on an operator whose left operand is being folded.
        enum Frame<'t, T> {
            /// The right operand is still to be visited.
            Right(OperatorKind, &'t ExpressionNode),
            /// The left operand is folded; waiting on the right one.
            Combine(OperatorKind, T),
        }

        let mut stack: Vec<Frame<'t, T>> = Vec::new();
        let mut node = self;
        loop {
            let mut folded = loop {
                match node {
                    Self::Condition { field, value } => {
                        break leaf(field.as_str(), value.as_str())?;
                    }
                    Self::Operator { kind, left, right } => {
                        stack.push(Frame::Right(*kind, &**right));
                        node = &**left;
                    }
                }
            };
            loop {
                match stack.pop() {
                    None => return Ok(folded),
                    Some(Frame::Right(kind, right)) => {
                        stack.push(Frame::Combine(kind, folded));
                        node = right;
                        break;
                    }
                    Some(Frame::Combine(kind, left)) => folded = combine(kind, left, folded)?,
                }
            }
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let Ok(depth) = self.try_fold::<usize, Infallible>(
            |_, _| Ok(1),
            |_, left, right| Ok(1 + left.max(right)),
        );
        depth
    }

    /// Formats the expression as a canonical query string.
    ///
    /// Nested operators are always bracketed, so compiling the output yields an
    /// identical tree: `ti=a AND (au=b OR au=c)`.
    pub fn to_query_string(&self) -> String {
        /// Output still to be written, popped in order.
        enum Piece<'t> {
            /// A sub-tree, and whether it sits under an operator.
            Node(&'t ExpressionNode, bool),
            /// An operator keyword with its surrounding spaces.
            Operator(OperatorKind),
            /// A bracket.
            Bracket(char),
        }

        let mut out = String::new();
        let mut stack = vec![Piece::Node(self, false)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Node(Self::Condition { field, value }, _) => {
                    out.push_str(field);
                    out.push('=');
                    out.push_str(value);
                }
                Piece::Node(Self::Operator { kind, left, right }, nested) => {
                    if nested {
                        stack.push(Piece::Bracket(')'));
                    }
                    stack.push(Piece::Node(right, true));
                    stack.push(Piece::Operator(*kind));
                    stack.push(Piece::Node(left, true));
                    if nested {
                        stack.push(Piece::Bracket('('));
                    }
                }
                Piece::Operator(kind) => {
                    out.push(' ');
                    out.push_str(kind.keyword());
                    out.push(' ');
                }
                Piece::Bracket(c) => out.push(c),
            }
        }
        out
    }
}

impl Clone for ExpressionNode {
    fn clone(&self) -> Self {
        let Ok(copy) = self.try_fold::<Self, Infallible>(
            |field, value| Ok(Self::condition(field, value)),
            |kind, left, right| Ok(Self::operator(kind, left, right)),
        );
        copy
    }
}

impl PartialEq for ExpressionNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some(pair) = stack.pop() {
            match pair {
                (
                    Self::Condition { field, value },
                    Self::Condition {
                        field: other_field,
                        value: other_value,
                    },
                ) => {
                    if field != other_field || value != other_value {
                        return false;
                    }
                }
                (
                    Self::Operator { kind, left, right },
                    Self::Operator {
                        kind: other_kind,
                        left: other_left,
                        right: other_right,
                    },
                ) => {
                    if kind != other_kind {
                        return false;
                    }
                    stack.push((&**right, &**other_right));
                    stack.push((&**left, &**other_left));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Drop for ExpressionNode {
    fn drop(&mut self) {
        /// A leaf left behind in a detached operator, which then drops without recursing.
        fn detach(node: &mut ExpressionNode) -> ExpressionNode {
            mem::replace(node, ExpressionNode::condition(String::new(), String::new()))
        }

        let mut stack = Vec::new();
        if let Self::Operator { left, right, .. } = self {
            stack.push(detach(left));
            stack.push(detach(right));
        }
        while let Some(mut node) = stack.pop() {
            if let Self::Operator { left, right, .. } = &mut node {
                stack.push(detach(left));
                stack.push(detach(right));
            }
        }
    }
}

impl fmt::Display for ExpressionNode {
    /// Renders the tree one node per line, children indented under their operator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self, 0)];
        while let Some((node, indent)) = stack.pop() {
            let prefix = "  ".repeat(indent);
            match node {
                Self::Condition { field, value } => writeln!(f, "{prefix}{field} = {value:?}")?,
                Self::Operator { kind, left, right } => {
                    writeln!(f, "{prefix}{kind}")?;
                    stack.push((&**right, indent + 1));
                    stack.push((&**left, indent + 1));
                }
            }
        }
        Ok(())
    }
}
