//! Pager
//!
//! Runs the cursor pagination loop: build request, fetch, decode, append,
//! decide, pace. Retryable failures are re-issued within the configured
//! budget after a backoff wait that honours `Retry-After` and never drops
//! below [`MIN_RETRY_DELAY`]. Errors never escape the loop; they end it with
//! [`HarvestStatus::FailedWithPartial`] and the records gathered so far.

use super::source::{Pacer, PageSource};
use super::types::{
    decide_continuation, Continuation, HarvestConfig, HarvestOutcome, HarvestState,
    HarvestStatus, PageRequest,
};
use crate::decode::{PageDecoder, PageResponse};
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Shortest wait before re-issuing a failed page request
pub const MIN_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Cursor pagination state machine
#[derive(Debug, Clone)]
pub struct Pager {
    config: HarvestConfig,
    decoder: PageDecoder,
}

impl Pager {
    /// Create a pager for the given harvest
    pub fn new(config: HarvestConfig) -> Self {
        Self {
            config,
            decoder: PageDecoder::new(),
        }
    }

    /// Get the harvest configuration
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Fetch pages until the API runs out or a request fails
    pub async fn run_harvest(&self, source: &dyn PageSource, pacer: &dyn Pacer) -> HarvestOutcome {
        let mut state = HarvestState::new();
        let mut anomaly = false;

        while state.continuing {
            info!(
                page = state.page_index,
                total_accumulated = state.accumulated.len(),
                "Fetching page"
            );

            let request = self.config.page_request(state.current_cursor.clone());
            let page = match self.fetch_with_retry(source, pacer, &request, state.page_index).await {
                Ok(page) => page,
                Err(e) => {
                    error!(
                        page = state.page_index,
                        total_accumulated = state.accumulated.len(),
                        "Harvest aborted: {e}"
                    );
                    return HarvestOutcome {
                        pages_fetched: state.page_index - 1,
                        records: state.accumulated,
                        status: HarvestStatus::FailedWithPartial,
                        anomaly,
                        failure: Some(e),
                    };
                }
            };

            let decision = decide_continuation(&page, self.config.page_size);
            debug!(
                page = state.page_index,
                records = page.len(),
                cursor = ?page.next_cursor,
                has_more = ?page.more_available,
                "Decoded page"
            );
            state.accumulated.append(page.records);

            match decision {
                Continuation::Next(cursor) => {
                    state.advance(cursor);
                    self.pace(pacer).await;
                }
                Continuation::Done => state.finish(),
                Continuation::Anomaly => {
                    warn!(
                        page = state.page_index,
                        "has_more is true but no cursor found; stopping to prevent an infinite loop"
                    );
                    anomaly = true;
                    state.finish();
                }
            }
        }

        info!(
            pages = state.page_index,
            total = state.accumulated.len(),
            "Harvest completed"
        );

        HarvestOutcome {
            pages_fetched: state.page_index,
            records: state.accumulated,
            status: HarvestStatus::Completed,
            anomaly,
            failure: None,
        }
    }

    /// Fetch a page, retrying retryable failures within the configured budget
    async fn fetch_with_retry(
        &self,
        source: &dyn PageSource,
        pacer: &dyn Pacer,
        request: &PageRequest,
        page_index: u32,
    ) -> Result<PageResponse> {
        let budget = self.config.max_consecutive_failures;
        let mut failures = 0;

        loop {
            match self.fetch_page(source, request).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && failures < budget => {
                    failures += 1;
                    let delay = self.retry_delay(failures, &e);
                    warn!(
                        page = page_index,
                        attempt = failures,
                        max_retries = budget,
                        ?delay,
                        "Page request failed, retrying: {e}"
                    );
                    pacer.backoff(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait before retry number `failures` (1-based)
    ///
    /// A server-supplied `Retry-After` wins; otherwise the wait doubles from
    /// the inter-page delay. Both are floored at [`MIN_RETRY_DELAY`].
    fn retry_delay(&self, failures: u32, error: &Error) -> Duration {
        let backoff = self
            .config
            .inter_page_delay
            .max(MIN_RETRY_DELAY)
            .saturating_mul(2u32.saturating_pow(failures.saturating_sub(1)));
        error
            .retry_after()
            .map_or(backoff, |wait| wait.max(MIN_RETRY_DELAY))
    }

    async fn fetch_page(&self, source: &dyn PageSource, request: &PageRequest) -> Result<PageResponse> {
        let body = source.fetch(request).await?;
        self.decoder.decode(&body)
    }

    async fn pace(&self, pacer: &dyn Pacer) {
        let delay = self.config.inter_page_delay;
        if !delay.is_zero() {
            debug!(?delay, "Waiting before next page");
        }
        pacer.pause(delay).await;
    }
}
