//! Decoder types
//!
//! Defines the decoded shape of one page response.

use crate::types::JsonValue;

/// One decoded page of the paginated API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResponse {
    /// Records on this page, in response order
    pub records: Vec<JsonValue>,
    /// Token for the next page (never empty when present)
    pub next_cursor: Option<String>,
    /// Advisory "more data" flag, when the API sends one
    pub more_available: Option<bool>,
}

impl PageResponse {
    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the page carried no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check if a next-page token was found
    pub fn has_cursor(&self) -> bool {
        self.next_cursor.is_some()
    }
}
