//! Fetch command implementation

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{Cli, CliError};
use crate::client::config::{COUNTY_DELAY_MS, MAX_ATTEMPTS, REQUEST_DELAY_MS};
use crate::client::RequestExecutor;
use crate::fetcher::HudClient;
use crate::output::local::DEFAULT_DATA_DIR;
use crate::output::{LocalJsonSink, RemoteSinks};
use crate::pipeline::StateProcessor;
use crate::StorageMode;

/// Fetch command arguments
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Comma-separated two-letter state codes (e.g., TX,FL,CA)
    #[arg(long, value_delimiter = ',', required = true)]
    pub states: Vec<String>,

    /// Publication year
    #[arg(long)]
    pub year: u16,

    /// Where to store packages: local, remote or both
    #[arg(long, default_value = "remote")]
    pub storage: StorageMode,

    /// Root directory for local JSON packages
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Delay before every API request, in milliseconds
    #[arg(long, default_value_t = REQUEST_DELAY_MS)]
    pub request_delay_ms: u64,

    /// Extra delay before each county-level request, in milliseconds
    #[arg(long, default_value_t = COUNTY_DELAY_MS)]
    pub county_delay_ms: u64,

    /// Attempts per request, including the first (range: 1-10)
    #[arg(long, default_value_t = MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,
}

impl FetchArgs {
    /// Normalized state codes, in the order given
    pub fn state_codes(&self) -> Vec<String> {
        self.states
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Process every state in order, stopping at the first failure
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let states = self.state_codes();
        if states.is_empty() {
            return Err(CliError::InvalidArgument(
                "at least one state code is required".to_string(),
            ));
        }

        // Credentials are checked before any request is made
        let token = cli.api_token()?;
        let remote = if self.storage.writes_remote() {
            RemoteSinks::connected(cli.blob_container()?)
        } else {
            RemoteSinks::disconnected()
        };

        let mut settings = cli.settings();
        settings.request_delay = Duration::from_millis(self.request_delay_ms);
        settings.county_delay = Duration::from_millis(self.county_delay_ms);
        settings.retry = settings.retry.with_max_attempts(self.max_attempts);

        let executor = RequestExecutor::new(token.expose(), &settings)?;
        let source = Arc::new(HudClient::new(executor, settings.base_url.clone()));
        let processor = StateProcessor::new(
            source,
            settings.county_delay,
            LocalJsonSink::new(self.data_dir.clone()),
            remote,
        );

        info!(
            states = ?states,
            year = self.year,
            storage = %self.storage,
            "Starting fetch"
        );
        for state in &states {
            processor.process_state(state, self.year, self.storage).await?;
        }
        info!(states = states.len(), year = self.year, "Fetch completed");
        Ok(())
    }
}
