//! Pagination module
//!
//! # Overview
//!
//! Cursor pagination with termination inference. The [`Pager`] requests
//! `{base}/v1/{resource}?{filters}&limit=N[&cursor=T]` one page at a time,
//! appends each page's records in order, and continues while the API
//! reports more data (`has_more`) or returns a full page with a cursor.
//! A fixed delay separates consecutive pages.

mod pager;
mod source;
mod types;

pub use pager::{Pager, MIN_RETRY_DELAY};
pub use source::{Pacer, PageSource, SleepPacer};
pub use types::{
    decide_continuation, Continuation, HarvestConfig, HarvestOutcome, HarvestState,
    HarvestStatus, PageRequest, API_VERSION, CURSOR_PARAM, LIMIT_PARAM,
};
