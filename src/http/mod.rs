//! HTTP client module
//!
//! Provides the page transport: an authenticated JSON GET client with
//! optional rate limiting. Each call is a single attempt; the pager owns
//! the retry policy.
//!
//! # Features
//!
//! - **Bearer Auth**: `Authorization: Bearer <token>` on every request
//! - **Retry-After**: carried on status errors for the pager's retry delay
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
