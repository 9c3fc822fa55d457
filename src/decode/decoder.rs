//! Page decoder
//!
//! Extracts the record batch, the next-page token and the advisory
//! "more" flag from a raw JSON page body.

use super::types::PageResponse;
use crate::error::{Error, Result};
use crate::types::{JsonValue, OptionStringExt};

/// Top-level field holding the record array
pub const RECORDS_FIELD: &str = "data";

/// Top-level boolean advertising further pages
pub const MORE_FIELD: &str = "has_more";

/// Token locations, in order of precedence
pub const CURSOR_PATHS: [&str; 2] = ["cursor", "meta.cursor"];

/// Decoder for cursor-paginated JSON pages
///
/// Decoding is tolerant: a missing `data` field yields an empty page and
/// a missing token yields no cursor. Only a body that is not JSON at all
/// is an error.
#[derive(Debug, Clone)]
pub struct PageDecoder {
    records_field: String,
    cursor_paths: Vec<String>,
    more_field: String,
}

impl Default for PageDecoder {
    fn default() -> Self {
        Self {
            records_field: RECORDS_FIELD.to_string(),
            cursor_paths: CURSOR_PATHS.iter().map(ToString::to_string).collect(),
            more_field: MORE_FIELD.to_string(),
        }
    }
}

impl PageDecoder {
    /// Create a decoder for the standard page layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw response body
    pub fn decode(&self, body: &str) -> Result<PageResponse> {
        let value: JsonValue = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
        Ok(self.decode_value(&value))
    }

    /// Decode an already parsed response body
    pub fn decode_value(&self, value: &JsonValue) -> PageResponse {
        let records = match value.get(&self.records_field) {
            Some(JsonValue::Array(arr)) => arr.clone(),
            _ => Vec::new(),
        };

        let next_cursor = self
            .cursor_paths
            .iter()
            .find_map(|path| lookup_path(value, path).and_then(token_string));

        let more_available = value.get(&self.more_field).and_then(JsonValue::as_bool);

        PageResponse {
            records,
            next_cursor,
            more_available,
        }
    }
}

/// Walk a dot-separated path through nested objects
pub(crate) fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    path.split('.')
        .try_fold(value, |current, part| current.get(part))
}

/// Render a token value as a non-empty string
pub(crate) fn token_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => s.clone().none_if_empty(),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
