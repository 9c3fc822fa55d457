//! CLI commands and argument parsing

use crate::config::HarvestSettings;
use crate::error::{Error, Result};
use crate::types::TableFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Cursor-paginated API harvester
#[derive(Parser, Debug)]
#[command(name = "cursor-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page and export the records
    Harvest(RunArgs),

    /// Fetch one record and report where pagination fields live
    Probe {
        /// Settings overrides
        #[command(flatten)]
        args: RunArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Overrides applied on top of the settings file
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// API root
    #[arg(long)]
    pub base_url: Option<String>,

    /// Resource path below `/v1/`
    #[arg(long)]
    pub resource: Option<String>,

    /// Fiscal year filter (`tahun`)
    #[arg(long)]
    pub year: Option<u32>,

    /// Institution code filter (`kode_klpd`)
    #[arg(long)]
    pub klpd: Option<String>,

    /// Extra filter parameter, repeatable
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Records per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Delay between pages in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Retries per page for 429/5xx/connect failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Directory receiving the export file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum)]
    pub format: Option<TableFormat>,

    /// Filename prefix for exports
    #[arg(long)]
    pub prefix: Option<String>,

    /// Sheet name for complete exports
    #[arg(long)]
    pub sheet: Option<String>,
}

impl RunArgs {
    /// Apply the overrides that were given
    pub fn apply(&self, settings: &mut HarvestSettings) -> Result<()> {
        if let Some(url) = &self.base_url {
            settings.base_url.clone_from(url);
        }
        if let Some(resource) = &self.resource {
            settings.resource_path.clone_from(resource);
        }
        if let Some(year) = self.year {
            settings.year = Some(year);
        }
        if let Some(klpd) = &self.klpd {
            settings.klpd_code = Some(klpd.clone());
        }
        for pair in &self.filters {
            let (key, value) = parse_filter(pair)?;
            settings.filters.insert(key, value);
        }
        if let Some(size) = self.page_size {
            settings.page_size = size;
        }
        if let Some(delay) = self.delay_ms {
            settings.delay_ms = delay;
        }
        if let Some(retries) = self.max_retries {
            settings.max_retries = retries;
        }
        if let Some(dir) = &self.output_dir {
            settings.output.directory.clone_from(dir);
        }
        if let Some(format) = self.format {
            settings.output.format = format;
        }
        if let Some(prefix) = &self.prefix {
            settings.output.filename_prefix = Some(prefix.clone());
        }
        if let Some(sheet) = &self.sheet {
            settings.output.sheet_name = Some(sheet.clone());
        }
        Ok(())
    }
}

/// Split a `key=value` filter argument
fn parse_filter(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(Error::invalid_value(
            "filter",
            format!("expected KEY=VALUE, got '{pair}'"),
        )),
    }
}
