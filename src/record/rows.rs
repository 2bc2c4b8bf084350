//! Row iterator
//!
//! The cursor lives here, not in the record: each `Record::iter` call starts
//! at row zero, and the shared borrow keeps the record from being appended
//! to or reloaded while rows are in flight.

use std::iter::FusedIterator;

use super::value::Value;

static NULL: Value = Value::Null;

/// Forward-only iterator over record rows.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    columns: &'a [(String, Vec<Value>)],
    cursor: usize,
    row_count: usize,
}

impl<'a> Rows<'a> {
    pub(super) fn new(columns: &'a [(String, Vec<Value>)], row_count: usize) -> Self {
        Self {
            columns,
            cursor: 0,
            row_count,
        }
    }

    /// Index of the next row to be produced
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for Rows<'a> {
    type Item = Vec<&'a Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.row_count {
            return None;
        }
        let at = self.cursor;
        self.cursor += 1;
        Some(
            self.columns
                .iter()
                .map(|(_, values)| values.get(at).unwrap_or(&NULL))
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.row_count - self.cursor;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Rows<'_> {}

impl FusedIterator for Rows<'_> {}
