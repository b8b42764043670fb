//! Generic retry loop and failure classification for log messages.

use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

use super::config::RetryPolicy;
use crate::metrics;

/// Classification of request failures for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429
    RateLimit,
    /// HTTP 200 with a payload that is neither an envelope nor an array
    UnexpectedShape,
    /// HTTP 200 with a body that is not JSON
    Decode,
    /// HTTP 5xx
    ServerError(u16),
    /// HTTP 401/403
    AuthFailed(u16),
    /// Any other non-200 status
    ClientError(u16),
    /// Connection, DNS or timeout failure
    Network,
}

impl FailureKind {
    /// Short description used inside retry log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RateLimit => "rate limit exceeded",
            Self::UnexpectedShape => "unexpected response structure",
            Self::Decode => "malformed JSON response",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::AuthFailed(_) => "authentication failed",
            Self::ClientError(code) => match code {
                404 => "resource not found",
                _ => "client error",
            },
            Self::Network => "network error",
        }
    }

    /// Remediation hint logged with the final failure.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::RateLimit => "Increase --request-delay-ms or --county-delay-ms",
            Self::UnexpectedShape | Self::Decode => {
                "The API response format may have changed; inspect the raw response"
            }
            Self::ServerError(_) => "HUD API may be experiencing issues, try again later",
            Self::AuthFailed(_) => "Verify HUD_API_TOKEN is valid and not expired",
            Self::ClientError(_) => "Check the state code, entity id and year arguments",
            Self::Network => "Check network connectivity and try again",
        }
    }

    /// Classify an HTTP status that is not 200
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimit,
            401 | 403 => Self::AuthFailed(status),
            500..=599 => Self::ServerError(status),
            _ => Self::ClientError(status),
        }
    }
}

/// Failures that can describe themselves for retry logging
pub trait Classified {
    /// Failure classification
    fn kind(&self) -> FailureKind;
}

/// Run `operation` until it succeeds or `policy` runs out of attempts.
///
/// The closure receives the 1-based attempt number. Every failure is retried;
/// the error of the final attempt is returned unchanged.
pub async fn retry_with_policy<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classified + Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, max_attempts, "Retry attempt succeeded");
                }
                return Ok(value);
            }
            Err(err) if attempt < max_attempts => {
                let backoff = policy.backoff(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    backoff_secs = backoff.as_secs_f64(),
                    error = %err,
                    "Retrying after {} - waiting {:.1} seconds",
                    err.kind().description(),
                    backoff.as_secs_f64()
                );
                metrics::record_retry(err.kind().description());
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
