// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # cursor-harvest
//!
//! Harvests every record from a cursor-paginated JSON API and exports them
//! as one table, even when the run is cut short.
//!
//! ## Features
//!
//! - **Cursor Pagination**: Follows `cursor` / `meta.cursor` tokens, inferring
//!   the end from `has_more` and page fullness
//! - **Pacing**: Fixed delay between pages, optional retries and rate limiting
//! - **Crash-safe Export**: Records gathered before a failure are written to
//!   an `emergency_` file instead of being lost
//! - **Arrow Output**: Parquet or CSV with the union of record keys as columns
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cursor_harvest::config::HarvestSettings;
//! use cursor_harvest::engine::{ExportLabels, Harvester};
//! use cursor_harvest::http::HttpClient;
//! use cursor_harvest::output::Exporter;
//! use cursor_harvest::pagination::{Pager, SleepPacer};
//!
//! #[tokio::main]
//! async fn main() -> cursor_harvest::Result<()> {
//!     let settings = HarvestSettings::default();
//!     let client = HttpClient::with_config(settings.http_config(settings.read_token()?))?;
//!
//!     let harvester = Harvester::new(
//!         Pager::new(settings.harvest_config()?),
//!         Exporter::new(settings.export_config()),
//!         ExportLabels::new(settings.sheet_name(), settings.filename_prefix()),
//!     );
//!     let report = harvester.run(&client, &SleepPacer).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Harvester                         │
//! │   run(source, pacer) → HarvestReport (single export)     │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌──────────┬─────────────────┴──┬─────────────┬────────────┐
//! │   HTTP   │      Paginate      │   Decode    │   Output   │
//! ├──────────┼────────────────────┼─────────────┼────────────┤
//! │ Bearer   │ Cursor loop        │ data        │ Parquet    │
//! │ JSON GET │ has_more/fullness  │ cursor      │ CSV        │
//! │ Rate     │ Inter-page delay   │ meta.cursor │ Emergency  │
//! └──────────┴────────────────────┴─────────────┴────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with bearer auth and rate limiting
pub mod http;

/// Page body decoding
pub mod decode;

/// Ordered record buffer
pub mod accumulator;

/// Cursor pagination loop
pub mod pagination;

/// Arrow/Parquet/CSV export
pub mod output;

/// Harvest driver and reporting
pub mod engine;

/// Settings file and defaults
pub mod config;

/// Response layout probe
pub mod probe;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use accumulator::Accumulator;
pub use engine::{HarvestReport, Harvester};
pub use pagination::{HarvestStatus, Pager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
