//! Execution engine module
//!
//! Harvest driver: runs the page loop, then exports once.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Harvester` - Runs the [`Pager`] and exports the result from a single
//!   point, whatever way the loop ended
//! - `ExportLabels` - Sheet and filename labels for complete and partial runs
//! - `HarvestReport` - What was fetched and where it was written

mod types;

pub use types::{ExportLabels, HarvestReport};

use crate::error::{Error, Result};
use crate::output::Exporter;
use crate::pagination::{HarvestOutcome, HarvestStatus, Pacer, PageSource, Pager};
use std::time::Instant;
use tracing::{info, warn};

/// Harvest driver
#[derive(Debug, Clone)]
pub struct Harvester {
    /// Page loop
    pager: Pager,
    /// Table writer
    exporter: Exporter,
    /// Export labelling
    labels: ExportLabels,
}

impl Harvester {
    /// Create a new harvester
    pub fn new(pager: Pager, exporter: Exporter, labels: ExportLabels) -> Self {
        Self {
            pager,
            exporter,
            labels,
        }
    }

    /// Run the harvest and export whatever was accumulated
    ///
    /// A transport failure does not make this return `Err`; it is reported
    /// through [`HarvestReport::status`] after the partial export. Only an
    /// export failure is returned as an error; if the run had already
    /// failed, that error names both causes.
    pub async fn run(&self, source: &dyn PageSource, pacer: &dyn Pacer) -> Result<HarvestReport> {
        let start = Instant::now();
        info!(
            resource = %self.pager.config().resource_path,
            page_size = self.pager.config().page_size,
            "Starting harvest"
        );

        let outcome = self.pager.run_harvest(source, pacer).await;
        let report = self.finish(outcome)?;

        info!(
            status = %report.status,
            records = report.record_count,
            pages = report.pages_fetched,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Harvest finished"
        );
        Ok(report)
    }

    /// The single export point for both terminal states
    fn finish(&self, outcome: HarvestOutcome) -> Result<HarvestReport> {
        let (sheet_name, prefix, stamp) = self.labels.for_status(outcome.status);

        if outcome.status == HarvestStatus::FailedWithPartial && !outcome.records.is_empty() {
            warn!(
                records = outcome.record_count(),
                "Saving partial data after failure"
            );
        }

        let export = match self
            .exporter
            .export(outcome.records.snapshot(), sheet_name, &prefix, stamp)
        {
            Ok(export) => export,
            Err(export_err) => {
                return Err(match &outcome.failure {
                    Some(failure) => Error::output(format!(
                        "Emergency export failed: {export_err}; harvest aborted by: {failure}"
                    )),
                    None => export_err,
                })
            }
        };

        Ok(HarvestReport {
            status: outcome.status,
            record_count: outcome.record_count(),
            pages_fetched: outcome.pages_fetched,
            anomaly: outcome.anomaly,
            export,
            error: outcome.failure.map(|e| e.to_string()),
        })
    }
}
