//! CLI module
//!
//! Command-line interface for running harvests.
//!
//! # Commands
//!
//! - `harvest` - Fetch every page and export the records
//! - `probe` - Fetch one record and report the response layout

mod commands;
mod runner;

pub use commands::{Cli, Commands, RunArgs};
pub use runner::Runner;
