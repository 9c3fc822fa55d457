//! Harvest settings
//!
//! Settings come from three layers, lowest precedence first: built-in
//! defaults for the e-Katalog archive endpoint, an optional YAML file, and
//! command-line overrides. The bearer token is never stored in the file;
//! it is read from the environment variable named by `token_env`.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::output::ExportConfig;
use crate::pagination::HarvestConfig;
use crate::types::{StringMap, TableFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://data.inaproc.id/api";

/// Default resource below `/v1/`
pub const DEFAULT_RESOURCE_PATH: &str = "ekatalog-archive/paket-e-purchasing";

/// Default environment variable holding the bearer token
pub const DEFAULT_TOKEN_ENV: &str = "JWT_TOKEN";

/// Sheet name used for partial exports
pub const EMERGENCY_SHEET_NAME: &str = "Emergency Save";

/// Query parameter for the fiscal year filter
pub const YEAR_PARAM: &str = "tahun";

/// Query parameter for the institution (KLPD) filter
pub const KLPD_PARAM: &str = "kode_klpd";

/// Complete settings for one harvest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    /// API root
    pub base_url: String,
    /// Resource below `/v1/`
    pub resource_path: String,
    /// Records per page
    pub page_size: u32,
    /// Fiscal year filter (`tahun`)
    pub year: Option<u32>,
    /// Institution code filter (`kode_klpd`)
    pub klpd_code: Option<String>,
    /// Additional filter query parameters
    pub filters: StringMap,
    /// Delay between pages in milliseconds
    pub delay_ms: u64,
    /// Retries per page for 429/5xx/connect failures (0 = abort immediately)
    pub max_retries: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Optional requests-per-second ceiling
    pub rate_limit: Option<RateLimiterConfig>,
    /// Environment variable holding the bearer token
    pub token_env: String,
    /// Export settings
    pub output: OutputSettings,
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory receiving the export files
    pub directory: PathBuf,
    /// Table format
    pub format: TableFormat,
    /// Filename prefix; defaults to `hasil_rup_{year}`
    pub filename_prefix: Option<String>,
    /// Sheet name for complete runs; defaults to `RUP {year}`
    pub sheet_name: Option<String>,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource_path: DEFAULT_RESOURCE_PATH.to_string(),
            page_size: 100,
            year: Some(2024),
            klpd_code: Some("K34".to_string()),
            filters: StringMap::new(),
            delay_ms: 1000,
            max_retries: 0,
            timeout_secs: 30,
            rate_limit: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            output: OutputSettings::default(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: TableFormat::Parquet,
            filename_prefix: None,
            sheet_name: None,
        }
    }
}

impl HarvestSettings {
    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read settings {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Filter parameters sent with every page
    pub fn filter_params(&self) -> StringMap {
        let mut params = self.filters.clone();
        if let Some(year) = self.year {
            params.insert(YEAR_PARAM.to_string(), year.to_string());
        }
        if let Some(code) = &self.klpd_code {
            params.insert(KLPD_PARAM.to_string(), code.clone());
        }
        params
    }

    /// Pagination parameters, validated
    pub fn harvest_config(&self) -> Result<HarvestConfig> {
        let config = HarvestConfig {
            base_url: self.base_url.clone(),
            resource_path: self.resource_path.clone(),
            page_size: self.page_size,
            filter_params: self.filter_params(),
            inter_page_delay: Duration::from_millis(self.delay_ms),
            max_consecutive_failures: self.max_retries,
        };
        config.validate()?;
        Ok(config)
    }

    /// HTTP client settings for the given bearer token
    ///
    /// Retries are left to the pager, so the client makes a single attempt.
    pub fn http_config(&self, token: impl Into<String>) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .bearer_token(token);
        if let Some(rate_limit) = &self.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        builder.build()
    }

    /// Exporter settings
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig::new(&self.output.directory, self.output.format)
    }

    /// Filename prefix shared by complete and emergency exports
    pub fn filename_prefix(&self) -> String {
        match (&self.output.filename_prefix, self.year) {
            (Some(prefix), _) => prefix.clone(),
            (None, Some(year)) => format!("hasil_rup_{year}"),
            (None, None) => "hasil_rup".to_string(),
        }
    }

    /// Sheet name for complete exports
    pub fn sheet_name(&self) -> String {
        match (&self.output.sheet_name, self.year) {
            (Some(name), _) => name.clone(),
            (None, Some(year)) => format!("RUP {year}"),
            (None, None) => "RUP".to_string(),
        }
    }

    /// Read the bearer token from the configured environment variable
    pub fn read_token(&self) -> Result<String> {
        read_token(&self.token_env)
    }
}

/// Read a non-empty token from an environment variable
pub fn read_token(variable: &str) -> Result<String> {
    match std::env::var(variable) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(Error::missing_credential(variable)),
    }
}
