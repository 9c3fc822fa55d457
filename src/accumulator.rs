//! Record accumulator
//!
//! Append-only, ordered collection of every record harvested so far.
//! Records are never removed or reordered, so a failure on page N leaves
//! pages 1..N-1 intact for the emergency export.

use crate::types::JsonValue;

/// Ordered, append-only sequence of harvested records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    records: Vec<JsonValue>,
}

impl Accumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch, preserving its order
    pub fn append(&mut self, batch: impl IntoIterator<Item = JsonValue>) {
        self.records.extend(batch);
    }

    /// View of everything appended so far
    pub fn snapshot(&self) -> &[JsonValue] {
        &self.records
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing has been appended
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take ownership of the records
    pub fn into_records(self) -> Vec<JsonValue> {
        self.records
    }
}
