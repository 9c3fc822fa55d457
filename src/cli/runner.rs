//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, RunArgs};
use crate::config::HarvestSettings;
use crate::engine::{ExportLabels, Harvester};
use crate::error::Result;
use crate::http::HttpClient;
use crate::output::Exporter;
use crate::pagination::{Pager, SleepPacer};
use crate::probe::probe;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    ///
    /// Returns `Ok(false)` when a harvest ended on a transport failure; the
    /// partial export has already been written and reported by then.
    pub async fn run(&self) -> Result<bool> {
        match &self.cli.command {
            Commands::Harvest(args) => self.harvest(args).await,
            Commands::Probe { args, json } => {
                self.probe(args, *json).await?;
                Ok(true)
            }
        }
    }

    /// Settings file (if any) with command-line overrides applied
    fn load_settings(&self, args: &RunArgs) -> Result<HarvestSettings> {
        let mut settings = match &self.cli.config {
            Some(path) => HarvestSettings::load(path)?,
            None => HarvestSettings::default(),
        };
        args.apply(&mut settings)?;
        debug!(?settings, "Resolved settings");
        Ok(settings)
    }

    /// Authenticated client; fails before any request when the token is missing
    fn build_client(settings: &HarvestSettings) -> Result<HttpClient> {
        let token = settings.read_token()?;
        HttpClient::with_config(settings.http_config(token))
    }

    /// Full harvest with export
    async fn harvest(&self, args: &RunArgs) -> Result<bool> {
        let settings = self.load_settings(args)?;
        let config = settings.harvest_config()?;
        let client = Self::build_client(&settings)?;

        let harvester = Harvester::new(
            Pager::new(config),
            Exporter::new(settings.export_config()),
            ExportLabels::new(settings.sheet_name(), settings.filename_prefix()),
        );

        let report = harvester.run(&client, &SleepPacer).await?;
        println!("{report}");
        Ok(report.is_success())
    }

    /// One-record layout probe
    async fn probe(&self, args: &RunArgs, json: bool) -> Result<()> {
        let settings = self.load_settings(args)?;
        let config = settings.harvest_config()?;
        let client = Self::build_client(&settings)?;

        let report = probe(&client, &config).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{report}");
        }
        Ok(())
    }
}
