//! Tabular file exporter
//!
//! Writes the harvested records as a single-sheet table. Parquet files keep
//! the sheet name in their key-value metadata; CSV files have a header row
//! and leave missing cells blank.

use super::schema::{infer_table_schema, records_to_batch};
use crate::error::{Error, Result};
use crate::types::{JsonValue, TableFormat};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Parquet metadata key holding the sheet name
pub const SHEET_NAME_KEY: &str = "sheet_name";

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// File name (without directory)
    pub filename: String,
    /// Full path of the written file
    pub path: PathBuf,
    /// Rows written
    pub record_count: usize,
}

/// Suffix style appended to the filename prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStamp {
    /// UTC `YYYY-MM-DDTHH-MM-SS`, sorts lexically
    Timestamp,
    /// Milliseconds since the Unix epoch
    EpochMillis,
}

impl FileStamp {
    /// Render the stamp for a point in time
    pub fn render(self, at: DateTime<Utc>) -> String {
        match self {
            FileStamp::Timestamp => at.format("%Y-%m-%dT%H-%M-%S").to_string(),
            FileStamp::EpochMillis => at.timestamp_millis().to_string(),
        }
    }
}

/// Exporter configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory receiving the files
    pub directory: PathBuf,
    /// Output format
    pub format: TableFormat,
    /// Parquet compression
    pub compression: Compression,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: TableFormat::Parquet,
            compression: Compression::SNAPPY,
        }
    }
}

impl ExportConfig {
    /// Create a config writing to `directory`
    pub fn new(directory: impl Into<PathBuf>, format: TableFormat) -> Self {
        Self {
            directory: directory.into(),
            format,
            ..Default::default()
        }
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }
}

/// Writes record sets to timestamped tabular files
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an exporter
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Get the exporter configuration
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export `records` as one sheet named `dataset_label`
    ///
    /// Returns `Ok(None)` without touching the filesystem when there is
    /// nothing to write.
    pub fn export(
        &self,
        records: &[JsonValue],
        dataset_label: &str,
        filename_prefix: &str,
        stamp: FileStamp,
    ) -> Result<Option<ExportResult>> {
        if records.is_empty() {
            info!(sheet = dataset_label, "No data to export");
            return Ok(None);
        }

        std::fs::create_dir_all(&self.config.directory).map_err(|e| {
            Error::output(format!(
                "Failed to create output directory {}: {e}",
                self.config.directory.display()
            ))
        })?;

        let schema = infer_table_schema(records);
        let batch = records_to_batch(records, &schema)?;

        let base = format!("{filename_prefix}_{}", stamp.render(Utc::now()));
        let (path, file) =
            create_unique(&self.config.directory, &base, self.config.format.extension())?;

        match self.config.format {
            TableFormat::Parquet => {
                write_parquet(file, &batch, dataset_label, self.config.compression)?;
            }
            TableFormat::Csv => write_csv(file, &batch)?,
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(
            file = %path.display(),
            sheet = dataset_label,
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "Export written"
        );

        Ok(Some(ExportResult {
            filename,
            path,
            record_count: batch.num_rows(),
        }))
    }
}

/// Create `{base}[-n].{ext}` in `dir`, taking the first name nobody holds
///
/// Creation is exclusive, so an existing file is never truncated even if it
/// appears between runs of this loop.
pub(super) fn create_unique(dir: &Path, base: &str, ext: &str) -> Result<(PathBuf, File)> {
    let mut path = dir.join(format!("{base}.{ext}"));
    let mut n = 1;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                path = dir.join(format!("{base}-{n}.{ext}"));
                n += 1;
            }
            Err(e) => {
                return Err(Error::output(format!(
                    "Failed to create file {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

/// Write a batch as Parquet, tagging it with the sheet name
fn write_parquet(
    file: File,
    batch: &RecordBatch,
    sheet_name: &str,
    compression: Compression,
) -> Result<()> {
    let props = WriterProperties::builder()
        .set_compression(compression)
        .set_key_value_metadata(Some(vec![KeyValue::new(
            SHEET_NAME_KEY.to_string(),
            sheet_name.to_string(),
        )]))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Write a batch as CSV with a header row
fn write_csv(file: File, batch: &RecordBatch) -> Result<()> {
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    writer.write(batch)?;
    Ok(())
}
