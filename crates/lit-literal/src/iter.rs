//! Element iteration

use lit_types::Value;
use std::iter::FusedIterator;

/// Iterator over a snapshot of a literal's elements
///
/// Created by [`crate::Literal::iter`]. Holds its own handles, so mutation
/// of the literal after creation does not affect which elements are yielded.
#[derive(Debug, Clone)]
pub struct LiteralIter {
    values: Vec<Value>,
    next: usize,
}

impl LiteralIter {
    #[inline]
    pub(crate) fn new(values: Vec<Value>) -> Self {
        Self { values, next: 0 }
    }
}

impl Iterator for LiteralIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let value = self.values.get(self.next)?.clone();
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LiteralIter {}

impl FusedIterator for LiteralIter {}
