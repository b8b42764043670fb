//! CLI command implementations

use clap::{Parser, Subcommand};
use std::net::SocketAddr;

use crate::client::config::DEFAULT_BASE_URL;
use crate::client::PipelineSettings;
use crate::config::{
    ApiToken, ConnectionString, API_TOKEN_ENV, CONNECTION_STRING_ENV, DEFAULT_CONTAINER,
};
use crate::output::BlobContainer;

pub mod error;
pub mod fetch;
pub mod mock;
pub mod sources;
pub mod verify;

pub use error::CliError;
pub use fetch::FetchArgs;
pub use mock::MockArgs;
pub use sources::SourcesCommand;
pub use verify::VerifyCommand;

/// Fetch HUD housing datasets and store them locally or in blob storage
#[derive(Parser, Debug)]
#[command(name = "housing-data-pipeline", version, about)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// HUD User API bearer token
    #[arg(long, global = true, env = API_TOKEN_ENV, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Azure storage connection string
    #[arg(long, global = true, env = CONNECTION_STRING_ENV, hide_env_values = true)]
    pub connection_string: Option<String>,

    /// Blob container for packages and mock data
    #[arg(long, global = true, default_value = DEFAULT_CONTAINER)]
    pub container: String,

    /// HUD API base URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Serve Prometheus metrics on this address (e.g., 0.0.0.0:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch state and county datasets and store them
    Fetch(FetchArgs),

    /// List states, counties or metro areas known to the API
    Sources(SourcesCommand),

    /// Inspect stored blobs
    Verify(VerifyCommand),

    /// Generate and upload synthetic CRM/ERP data
    Mock(MockArgs),
}

impl Cli {
    /// API token from `--api-token` or the environment
    pub fn api_token(&self) -> Result<ApiToken, CliError> {
        Ok(ApiToken::from_setting(self.api_token.as_deref())?)
    }

    /// Container named by `--container`, connected with `--connection-string`
    pub fn blob_container(&self) -> Result<BlobContainer, CliError> {
        let connection = ConnectionString::from_setting(self.connection_string.as_deref())?;
        Ok(BlobContainer::from_connection(&connection, &self.container)?)
    }

    /// Default pipeline settings pointed at `--base-url`
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings::default().with_base_url(self.base_url.clone())
    }
}
