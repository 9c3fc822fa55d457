//! Response shape probe
//!
//! Sends a single `limit=1` request and reports where the API puts its
//! pagination fields, before committing to a full harvest.

use crate::decode::{lookup_path, token_string, CURSOR_PATHS, MORE_FIELD};
use crate::error::{Error, Result};
use crate::pagination::{HarvestConfig, PageSource, CURSOR_PARAM};
use crate::types::JsonValue;
use serde::Serialize;
use std::fmt;
use tracing::info;

/// Root fields worth reporting when present
const META_FIELD: &str = "meta";
const PAGINATION_FIELD: &str = "pagination";
const NEXT_PAGE_URL_FIELD: &str = "next_page_url";

/// Where pagination hints were found in a one-record response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    /// Top-level keys in document order
    pub root_keys: Vec<String>,
    /// Contents of `meta`
    pub meta: Option<JsonValue>,
    /// Contents of the top-level `cursor`
    pub root_cursor: Option<JsonValue>,
    /// Contents of `pagination`
    pub pagination: Option<JsonValue>,
    /// Contents of `next_page_url`
    pub next_page_url: Option<JsonValue>,
    /// Whether a top-level `cursor` key exists
    pub has_cursor_key: bool,
    /// Whether a top-level `has_more` key exists
    pub has_more_key: bool,
    /// First location, in decoder precedence, holding a usable token
    pub cursor_location: Option<String>,
}

impl ProbeReport {
    /// Build a report from a parsed response body
    pub fn from_body(body: &JsonValue) -> Result<Self> {
        let root = body
            .as_object()
            .ok_or_else(|| Error::decode("Probe response is not a JSON object"))?;

        let present = |key: &str| root.get(key).filter(|v| !v.is_null()).cloned();

        let cursor_location = CURSOR_PATHS
            .iter()
            .find(|path| lookup_path(body, path).and_then(token_string).is_some())
            .map(ToString::to_string);

        Ok(Self {
            root_keys: root.keys().cloned().collect(),
            meta: present(META_FIELD),
            root_cursor: present(CURSOR_PARAM),
            pagination: present(PAGINATION_FIELD),
            next_page_url: present(NEXT_PAGE_URL_FIELD),
            has_cursor_key: root.contains_key(CURSOR_PARAM),
            has_more_key: root.contains_key(MORE_FIELD),
            cursor_location,
        })
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Root keys: {:?}", self.root_keys)?;
        if let Some(meta) = &self.meta {
            writeln!(f, "Meta: {meta}")?;
        }
        if let Some(cursor) = &self.root_cursor {
            writeln!(f, "Cursor at root: {cursor}")?;
        }
        if let Some(pagination) = &self.pagination {
            writeln!(f, "Pagination: {pagination}")?;
        }
        if let Some(url) = &self.next_page_url {
            writeln!(f, "Next page URL: {url}")?;
        }
        writeln!(f, "Has \"cursor\" key? {}", self.has_cursor_key)?;
        writeln!(f, "Has \"has_more\" key? {}", self.has_more_key)?;
        write!(
            f,
            "Cursor location: {}",
            self.cursor_location.as_deref().unwrap_or("none")
        )
    }
}

/// Fetch one record and report the response layout
pub async fn probe(source: &dyn PageSource, config: &HarvestConfig) -> Result<ProbeReport> {
    let mut request = config.page_request(None);
    request.page_size = 1;

    info!(endpoint = %request.endpoint()?, "Probing response shape");
    let body = source.fetch(&request).await?;
    let value: JsonValue = serde_json::from_str(&body)?;
    ProbeReport::from_body(&value)
}
