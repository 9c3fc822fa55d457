//! Output module
//!
//! Turns the accumulated records into one tabular file.
//!
//! # Overview
//!
//! This module provides:
//! - Flat table schema inference over heterogeneous JSON records
//! - JSON to Arrow RecordBatch conversion
//! - Parquet and CSV writers with collision-free, timestamped filenames

mod schema;
mod writer;

pub use schema::{infer_table_schema, records_to_batch, VALUE_COLUMN};
pub use writer::{ExportConfig, ExportResult, Exporter, FileStamp, SHEET_NAME_KEY};
