//! Set-algebra evaluation of compiled queries.
//!
//! Leaves are resolved through a [`FieldLookup`]; operators combine their children's
//! document sets: `AND` intersects, `OR` unions and `NOT` subtracts the right set from
//! the left. Leaves are resolved left to right and the first failing lookup aborts
//! evaluation, so no partial result is returned.

use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicUsize, Ordering},
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::{
    ast::{ExpressionNode, OperatorKind},
    error::{EvalError, LookupError},
};

/// Identifier of a document in the searched corpus.
pub type DocumentId = u64;

/// An ordered set of matching documents.
pub type DocSet = BTreeSet<DocumentId>;

/// Resolves a single field condition to the documents that match it.
///
/// Implemented for any `Fn(&str, &str) -> Result<DocSet, LookupError>` closure, which is
/// convenient for tests and ad hoc backends.
pub trait FieldLookup {
    /// Returns the documents whose `field` matches `value`.
    fn lookup(&self, field: &str, value: &str) -> Result<DocSet, LookupError>;
}

impl<F> FieldLookup for F
where
    F: Fn(&str, &str) -> Result<DocSet, LookupError>,
{
    fn lookup(&self, field: &str, value: &str) -> Result<DocSet, LookupError> {
        self(field, value)
    }
}

/// Counters gathered while evaluating a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Number of leaf lookups performed.
    pub lookups: usize,
    /// Number of operator nodes combined.
    pub operators: usize,
}

/// Evaluates expression trees against a lookup backend.
pub struct Evaluator<'a, L: ?Sized> {
    /// The backend consulted for every leaf.
    lookup: &'a L,
    /// Lookups performed so far.
    lookups: AtomicUsize,
    /// Operator nodes combined so far.
    operators: AtomicUsize,
}

impl<'a, L: FieldLookup + ?Sized> Evaluator<'a, L> {
    /// Creates an evaluator over the given backend.
    pub fn new(lookup: &'a L) -> Self {
        Self {
            lookup,
            lookups: AtomicUsize::new(0),
            operators: AtomicUsize::new(0),
        }
    }

    /// Evaluates `root` to the set of matching documents.
    pub fn evaluate(&self, root: &ExpressionNode) -> Result<DocSet, EvalError> {
        root.try_fold(
            |field, value| self.leaf(field, value),
            |kind, left, right| Ok(self.combine(kind, left, right)),
        )
    }

    /// Evaluates `root`, resolving all of its leaves in parallel before combining them.
    ///
    /// Produces the same result as [`Evaluator::evaluate`]. When several lookups fail,
    /// the leftmost failure is reported.
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(&self, root: &ExpressionNode) -> Result<DocSet, EvalError>
    where
        L: Sync,
    {
        let mut resolved = root
            .conditions()
            .par_iter()
            .map(|(field, value)| self.leaf(field, value))
            .collect::<Vec<_>>()
            .into_iter();
        root.try_fold(
            |_, _| resolved.next().unwrap_or_else(|| Ok(DocSet::new())),
            |kind, left, right| Ok(self.combine(kind, left, right)),
        )
    }

    /// Returns the counters gathered so far.
    pub fn stats(&self) -> EvalStats {
        EvalStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            operators: self.operators.load(Ordering::Relaxed),
        }
    }

    /// Resolves one condition through the backend.
    fn leaf(&self, field: &str, value: &str) -> Result<DocSet, EvalError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let docs = self
            .lookup
            .lookup(field, value)
            .map_err(|source| EvalError::LookupFailed {
                field: field.to_string(),
                value: value.to_string(),
                source,
            })?;
        debug!(field, value, hits = docs.len(), "lookup");
        Ok(docs)
    }

    /// Applies an operator to two evaluated operands.
    fn combine(&self, kind: OperatorKind, left: DocSet, right: DocSet) -> DocSet {
        self.operators.fetch_add(1, Ordering::Relaxed);
        combine(kind, left, right)
    }
}

/// Applies the set operation for `kind`.
fn combine(kind: OperatorKind, mut left: DocSet, mut right: DocSet) -> DocSet {
    match kind {
        OperatorKind::And => {
            left.retain(|id| right.contains(id));
            left
        }
        OperatorKind::Or => {
            if left.len() < right.len() {
                right.append(&mut left);
                right
            } else {
                left.append(&mut right);
                left
            }
        }
        OperatorKind::Not => {
            left.retain(|id| !right.contains(id));
            left
        }
    }
}

/// Evaluates `root` against `lookup`.
///
/// Shorthand for [`Evaluator::new`] followed by [`Evaluator::evaluate`].
pub fn evaluate<L: FieldLookup + ?Sized>(
    root: &ExpressionNode,
    lookup: &L,
) -> Result<DocSet, EvalError> {
    Evaluator::new(lookup).evaluate(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u64]) -> DocSet {
        ids.iter().copied().collect()
    }

    fn cond(field: &str, value: &str) -> ExpressionNode {
        ExpressionNode::condition(field, value)
    }

    fn fixture(field: &str, value: &str) -> Result<DocSet, LookupError> {
        match (field, value) {
            ("ti", "cancer") => Ok(set(&[1, 2, 3])),
            ("au", "smith") => Ok(set(&[2, 3, 4])),
            ("ts", "2020") => Ok(set(&[3])),
            ("ti", _) | ("au", _) | ("ts", _) => Ok(DocSet::new()),
            _ => Err(LookupError::UnknownField(field.to_string())),
        }
    }

    #[test]
    fn leaf_is_lookup_result() {
        assert_eq!(
            evaluate(&cond("ti", "cancer"), &fixture).unwrap(),
            set(&[1, 2, 3])
        );
    }

    #[test]
    fn operators() {
        let and = ExpressionNode::and(cond("ti", "cancer"), cond("au", "smith"));
        let or = ExpressionNode::or(cond("ti", "cancer"), cond("au", "smith"));
        let not = ExpressionNode::not(cond("ti", "cancer"), cond("au", "smith"));
        assert_eq!(evaluate(&and, &fixture).unwrap(), set(&[2, 3]));
        assert_eq!(evaluate(&or, &fixture).unwrap(), set(&[1, 2, 3, 4]));
        assert_eq!(evaluate(&not, &fixture).unwrap(), set(&[1]));
    }

    #[test]
    fn not_is_ordered() {
        let tree = ExpressionNode::not(cond("au", "smith"), cond("ti", "cancer"));
        assert_eq!(evaluate(&tree, &fixture).unwrap(), set(&[4]));
    }

    #[test]
    fn lookup_failure_propagates() {
        let tree = ExpressionNode::or(cond("ti", "cancer"), cond("zz", "x"));
        let err = evaluate(&tree, &fixture).unwrap_err();
        assert_eq!(
            err,
            EvalError::LookupFailed {
                field: "zz".into(),
                value: "x".into(),
                source: LookupError::UnknownField("zz".into()),
            }
        );
    }

    #[test]
    fn stats_count_work() {
        let tree = ExpressionNode::not(
            ExpressionNode::and(cond("ti", "cancer"), cond("au", "smith")),
            cond("ts", "2020"),
        );
        let evaluator = Evaluator::new(&fixture);
        assert_eq!(evaluator.evaluate(&tree).unwrap(), set(&[2]));
        assert_eq!(
            evaluator.stats(),
            EvalStats {
                lookups: 3,
                operators: 2,
            }
        );
    }

    #[test]
    fn closure_lookup() {
        let lookup = |_: &str, value: &str| -> Result<DocSet, LookupError> {
            Ok(value.parse::<u64>().map(|id| set(&[id])).unwrap_or_default())
        };
        let tree = ExpressionNode::or(cond("id", "7"), cond("id", "9"));
        assert_eq!(evaluate(&tree, &lookup).unwrap(), set(&[7, 9]));
    }

    #[test]
    fn trait_object_lookup() {
        let lookup: &dyn FieldLookup = &fixture;
        assert_eq!(
            evaluate(&cond("ts", "2020"), lookup).unwrap(),
            set(&[3])
        );
    }

    #[test]
    fn long_chain_is_evaluated() {
        let tree = (1..50_000u64).fold(cond("id", "0"), |acc, i| {
            ExpressionNode::or(acc, cond("id", &i.to_string()))
        });
        let lookup = |_: &str, value: &str| -> Result<DocSet, LookupError> {
            Ok(value.parse::<u64>().map(|id| set(&[id])).unwrap_or_default())
        };
        let evaluator = Evaluator::new(&lookup);
        assert_eq!(
            evaluator.evaluate(&tree).unwrap(),
            (0..50_000).collect::<DocSet>()
        );
        assert_eq!(
            evaluator.stats(),
            EvalStats {
                lookups: 50_000,
                operators: 49_999,
            }
        );
    }

    #[test]
    fn first_failure_aborts() {
        let tree = ExpressionNode::or(cond("zz", "x"), cond("yy", "y"));
        let evaluator = Evaluator::new(&fixture);
        let err = evaluator.evaluate(&tree).unwrap_err();
        assert!(matches!(err, EvalError::LookupFailed { ref field, .. } if field == "zz"));
        assert_eq!(evaluator.stats().lookups, 1);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_reports_leftmost_failure() {
        let tree = ExpressionNode::or(
            ExpressionNode::and(cond("ti", "cancer"), cond("zz", "x")),
            cond("yy", "y"),
        );
        let err = Evaluator::new(&fixture).evaluate_parallel(&tree).unwrap_err();
        assert!(matches!(err, EvalError::LookupFailed { ref field, .. } if field == "zz"));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_long_chain() {
        let tree = (1..20_000u64).fold(cond("ti", "cancer"), |acc, _| {
            ExpressionNode::and(acc, cond("au", "smith"))
        });
        let parallel = Evaluator::new(&fixture).evaluate_parallel(&tree).unwrap();
        assert_eq!(parallel, set(&[2, 3]));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let tree = ExpressionNode::not(
            ExpressionNode::or(
                cond("ti", "cancer"),
                ExpressionNode::and(cond("au", "smith"), cond("ts", "2020")),
            ),
            cond("au", "smith"),
        );
        let evaluator = Evaluator::new(&fixture);
        let parallel = evaluator.evaluate_parallel(&tree).unwrap();
        assert_eq!(parallel, evaluate(&tree, &fixture).unwrap());
        assert_eq!(evaluator.stats().lookups, 4);
    }
}
