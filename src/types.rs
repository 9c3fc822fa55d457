//! Common types used throughout cursor-harvest
//!
//! This module contains shared type aliases and small utility types
//! used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Ordered string map, used for filter parameters so request URLs are stable
pub type StringMap = BTreeMap<String, String>;

// ============================================================================
// Table Format
// ============================================================================

/// Tabular file format produced by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// Apache Parquet (single row group set, sheet name kept in file metadata)
    #[default]
    Parquet,
    /// Comma-separated values with a header row
    Csv,
}

impl TableFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Parquet => "parquet",
            TableFormat::Csv => "csv",
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_format_extension() {
        assert_eq!(TableFormat::Parquet.extension(), "parquet");
        assert_eq!(TableFormat::Csv.extension(), "csv");

        let format: TableFormat = serde_yaml::from_str("csv").unwrap();
        assert_eq!(format, TableFormat::Csv);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!("test".to_string().none_if_empty(), Some("test".to_string()));
        assert_eq!(String::new().none_if_empty(), None);
    }
}
