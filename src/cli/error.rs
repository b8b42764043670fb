//! CLI error types and conversions

use crate::client::RequestError;
use crate::config::ConfigError;
use crate::fetcher::FetchError;
use crate::mock::MockError;
use crate::output::SinkError;
use crate::pipeline::PipelineError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Missing or invalid credentials
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client could not be built
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Listing or dataset fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// State processing failed
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Storage access failed
    #[error("storage error: {0}")]
    Sink(#[from] SinkError),

    /// Synthetic data generation or upload failed
    #[error("mock data error: {0}")]
    Mock(#[from] MockError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more expected blobs are missing or unreadable
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}
