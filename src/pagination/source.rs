//! Transport and pacing seams
//!
//! The pager talks to the network only through [`PageSource`] and waits
//! only through [`Pacer`], which keeps the inter-page pause apart from the
//! retry backoff. Production code uses
//! [`HttpClient`] and [`SleepPacer`]; tests substitute scripted versions.

use super::types::PageRequest;
use crate::error::Result;
use crate::http::HttpClient;
use async_trait::async_trait;
use std::time::Duration;

/// Fetches the raw body of one page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Issue the request and return the body of a successful response
    async fn fetch(&self, request: &PageRequest) -> Result<String>;
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch(&self, request: &PageRequest) -> Result<String> {
        let url = request.endpoint()?;
        self.get_text(&url, &request.query()).await
    }
}

/// Waits between pages and before retries
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Suspend for the inter-page delay
    async fn pause(&self, delay: Duration);

    /// Suspend before re-issuing a failed request
    async fn backoff(&self, delay: Duration);
}

/// Pacer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepPacer;

#[async_trait]
impl Pacer for SleepPacer {
    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn backoff(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
