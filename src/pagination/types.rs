//! Pagination types
//!
//! Request construction, harvest configuration, per-run state and the
//! continuation decision shared by the pager and its tests.

use crate::accumulator::Accumulator;
use crate::decode::PageResponse;
use crate::error::{Error, Result};
use crate::types::StringMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// Query parameter carrying the continuation token
pub const CURSOR_PARAM: &str = "cursor";

/// API version segment placed between the base URL and the resource path
pub const API_VERSION: &str = "v1";

// ============================================================================
// Harvest Configuration
// ============================================================================

/// Parameters fixed for the whole harvest
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestConfig {
    /// API root, e.g. `https://data.inaproc.id/api`
    pub base_url: String,
    /// Resource below `/v1/`, e.g. `ekatalog-archive/paket-e-purchasing`
    pub resource_path: String,
    /// Records requested per page
    pub page_size: u32,
    /// Filter query parameters sent with every page
    pub filter_params: StringMap,
    /// Pause between consecutive pages
    pub inter_page_delay: Duration,
    /// Retries allowed per page for retryable failures (0 = none)
    pub max_consecutive_failures: u32,
}

impl HarvestConfig {
    /// Create a config with no filters, no delay and no retries
    pub fn new(base_url: impl Into<String>, resource_path: impl Into<String>, page_size: u32) -> Self {
        Self {
            base_url: base_url.into(),
            resource_path: resource_path.into(),
            page_size,
            filter_params: StringMap::new(),
            inter_page_delay: Duration::ZERO,
            max_consecutive_failures: 0,
        }
    }

    /// Add a filter parameter
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_params.insert(key.into(), value.into());
        self
    }

    /// Set the inter-page delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_page_delay = delay;
        self
    }

    /// Set the per-page retry budget
    #[must_use]
    pub fn with_max_consecutive_failures(mut self, retries: u32) -> Self {
        self.max_consecutive_failures = retries;
        self
    }

    /// Build the request for a page
    pub fn page_request(&self, cursor: Option<String>) -> PageRequest {
        PageRequest {
            base_url: self.base_url.clone(),
            resource_path: self.resource_path.clone(),
            page_size: self.page_size,
            filter_params: self.filter_params.clone(),
            cursor,
        }
    }

    /// Reject configurations that cannot produce a harvest
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be positive"));
        }
        if self.resource_path.trim_matches('/').is_empty() {
            return Err(Error::invalid_value("resource_path", "must not be empty"));
        }
        Url::parse(&self.base_url)?;
        Ok(())
    }
}

// ============================================================================
// Page Request
// ============================================================================

/// One page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// API root
    pub base_url: String,
    /// Resource below `/v1/`
    pub resource_path: String,
    /// Records requested
    pub page_size: u32,
    /// Filter query parameters
    pub filter_params: StringMap,
    /// Token from the previous page, absent on the first page
    pub cursor: Option<String>,
}

impl PageRequest {
    /// Absolute endpoint URL `{base}/v1/{resource}`
    pub fn endpoint(&self) -> Result<String> {
        let base = self.base_url.trim_end_matches('/');
        let resource = self.resource_path.trim_matches('/');
        let url = Url::parse(&format!("{base}/{API_VERSION}/{resource}"))?;
        Ok(url.to_string())
    }

    /// Query pairs: filters, then `limit`, then `cursor` when present
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = self
            .filter_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.push((LIMIT_PARAM.to_string(), self.page_size.to_string()));
        if let Some(cursor) = &self.cursor {
            query.push((CURSOR_PARAM.to_string(), cursor.clone()));
        }
        query
    }

    /// Check if this is the first page of a harvest
    pub fn is_first_page(&self) -> bool {
        self.cursor.is_none()
    }
}

// ============================================================================
// Continuation Decision
// ============================================================================

/// What to do after a page has been appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Fetch the next page with this cursor
    Next(String),
    /// Pagination is complete
    Done,
    /// The API claimed more data but gave no cursor; stop
    Anomaly,
}

/// Decide whether to fetch another page
///
/// More pages exist when the API says so (`has_more`), or when the page is
/// full and carries a cursor. A "more" signal without a cursor would loop
/// forever on the same request, so it stops the harvest instead.
///
/// A full page without a cursor is treated as the last page; no extra
/// empty-page request is made. How far `has_more` can be trusted relative
/// to the fullness heuristic is an assumption about the upstream API.
pub fn decide_continuation(page: &PageResponse, page_size: u32) -> Continuation {
    let full_page = page.len() == page_size as usize;
    let continuing = page.more_available.unwrap_or(false) || (full_page && page.has_cursor());

    match (&page.next_cursor, continuing) {
        (Some(cursor), true) => Continuation::Next(cursor.clone()),
        (None, true) => Continuation::Anomaly,
        (_, false) => Continuation::Done,
    }
}

// ============================================================================
// Harvest State
// ============================================================================

/// Mutable state of one harvest, owned by the pager
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestState {
    /// Records collected so far
    pub accumulated: Accumulator,
    /// Cursor for the next request
    pub current_cursor: Option<String>,
    /// 1-based index of the page being fetched
    pub page_index: u32,
    /// Whether another page will be requested
    pub continuing: bool,
}

impl Default for HarvestState {
    fn default() -> Self {
        Self {
            accumulated: Accumulator::new(),
            current_cursor: None,
            page_index: 1,
            continuing: true,
        }
    }
}

impl HarvestState {
    /// Fresh state for a new harvest
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next page
    pub fn advance(&mut self, cursor: String) {
        self.current_cursor = Some(cursor);
        self.page_index += 1;
    }

    /// Stop requesting pages
    pub fn finish(&mut self) {
        self.continuing = false;
    }
}

// ============================================================================
// Harvest Status and Outcome
// ============================================================================

/// Terminal status of a harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestStatus {
    /// The loop ended because there were no more pages
    Completed,
    /// The loop was aborted by an error; records may be partial
    FailedWithPartial,
}

impl HarvestStatus {
    /// Stable label for reports and logs
    pub fn label(self) -> &'static str {
        match self {
            HarvestStatus::Completed => "completed",
            HarvestStatus::FailedWithPartial => "failed-with-partial",
        }
    }

    /// Check if the harvest finished normally
    pub fn is_completed(self) -> bool {
        matches!(self, HarvestStatus::Completed)
    }
}

impl fmt::Display for HarvestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of running the page loop
#[derive(Debug)]
pub struct HarvestOutcome {
    /// Everything accumulated before the loop ended
    pub records: Accumulator,
    /// How the loop ended
    pub status: HarvestStatus,
    /// Pages successfully fetched and decoded
    pub pages_fetched: u32,
    /// Whether the loop was stopped by a "more" flag without a cursor
    pub anomaly: bool,
    /// Error that aborted the loop
    pub failure: Option<Error>,
}

impl HarvestOutcome {
    /// Number of records accumulated
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}
