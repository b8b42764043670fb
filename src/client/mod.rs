//! Rate-limited HTTP access to the HUD API
//!
//! # Components
//!
//! - [`executor`] - authenticated GET with pacing, retries and payload classification
//! - [`retry`] - generic retry loop driven by a [`RetryPolicy`]
//! - [`rate_limit`] - fixed-delay throttle
//! - [`config`] - constants and runtime settings

pub mod config;
pub mod executor;
pub mod rate_limit;
pub mod retry;

pub use config::{PipelineSettings, RetryPolicy};
pub use executor::{classify_payload, RequestExecutor};
pub use rate_limit::RequestThrottle;
pub use retry::{retry_with_policy, Classified, FailureKind};

/// Request errors, all of which are retried by the executor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// HTTP 429
    #[error("rate limit exceeded")]
    RateLimited,

    /// HTTP 200 with a payload that is neither `{"data": ...}` nor an array
    #[error("unexpected API response structure: {0}")]
    UnexpectedShape(String),

    /// Any other non-200 status
    #[error("API request failed with status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 200 with a body that is not valid JSON
    #[error("invalid JSON response: {0}")]
    Decode(String),
}

/// Result type for request operations
pub type RequestResult<T> = Result<T, RequestError>;
