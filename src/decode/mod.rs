//! Response decoder module
//!
//! # Overview
//!
//! Turns a raw page body into a [`PageResponse`]: the `data` record array,
//! the next-page cursor and the optional `has_more` flag. Some deployments
//! of the API put the cursor at the top level and others under `meta`, so
//! the decoder checks both, top level first.

mod decoder;
mod types;

pub use decoder::{PageDecoder, CURSOR_PATHS, MORE_FIELD, RECORDS_FIELD};
pub(crate) use decoder::{lookup_path, token_string};
pub use types::PageResponse;

#[cfg(test)]
mod tests;
