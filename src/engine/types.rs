//! Engine types
//!
//! Export labelling and the final report handed back to the operator.

use crate::config::EMERGENCY_SHEET_NAME;
use crate::output::{ExportResult, FileStamp};
use crate::pagination::HarvestStatus;
use std::fmt;

/// Sheet and filename labels for both export paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLabels {
    /// Sheet name for complete runs
    pub sheet_name: String,
    /// Sheet name for partial runs
    pub emergency_sheet_name: String,
    /// Shared filename prefix
    pub filename_prefix: String,
}

impl ExportLabels {
    /// Labels with the standard emergency sheet name
    pub fn new(sheet_name: impl Into<String>, filename_prefix: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            emergency_sheet_name: EMERGENCY_SHEET_NAME.to_string(),
            filename_prefix: filename_prefix.into(),
        }
    }

    /// Sheet name, filename prefix and stamp style for a terminal status
    ///
    /// Complete runs write `{prefix}_full_{timestamp}`; partial runs write
    /// `emergency_{prefix}_{epoch-millis}` so the two can never be confused.
    pub fn for_status(&self, status: HarvestStatus) -> (&str, String, FileStamp) {
        match status {
            HarvestStatus::Completed => (
                &self.sheet_name,
                format!("{}_full", self.filename_prefix),
                FileStamp::Timestamp,
            ),
            HarvestStatus::FailedWithPartial => (
                &self.emergency_sheet_name,
                format!("emergency_{}", self.filename_prefix),
                FileStamp::EpochMillis,
            ),
        }
    }
}

/// Summary of one harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// How the page loop ended
    pub status: HarvestStatus,
    /// Records accumulated (and exported, when any)
    pub record_count: usize,
    /// Pages fetched successfully
    pub pages_fetched: u32,
    /// Whether pagination stopped on a "more" flag without a cursor
    pub anomaly: bool,
    /// Written file, `None` when there was no data
    pub export: Option<ExportResult>,
    /// Message of the error that aborted the loop
    pub error: Option<String>,
}

impl HarvestReport {
    /// Check if the run completed without a transport failure
    pub fn is_success(&self) -> bool {
        self.status.is_completed()
    }
}

impl fmt::Display for HarvestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        writeln!(
            f,
            "Total records: {} ({} pages)",
            self.record_count, self.pages_fetched
        )?;
        if self.anomaly {
            writeln!(f, "Warning: pagination stopped on has_more without a cursor")?;
        }
        match &self.export {
            Some(export) => write!(f, "Saved to: {}", export.path.display()),
            None => write!(f, "No data found"),
        }
    }
}
