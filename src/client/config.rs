//! Request pacing and retry configuration

use std::time::Duration;

/// Public HUD User API root
pub const DEFAULT_BASE_URL: &str = "https://www.huduser.gov/hudapi/public";

/// Delay before every request attempt in milliseconds.
pub const REQUEST_DELAY_MS: u64 = 1_000;

/// Extra delay before each county-level dataset request in milliseconds.
/// County iteration issues two requests per county, so it runs far more
/// requests per minute than the state-level calls.
pub const COUNTY_DELAY_MS: u64 = 2_000;

/// Maximum attempts per request, including the first one.
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff multiplier in milliseconds (wait = multiplier * 2^(attempt-1)).
pub const BACKOFF_MULTIPLIER_MS: u64 = 1_000;

/// Lower bound for a single backoff wait in milliseconds.
pub const MIN_BACKOFF_MS: u64 = 4_000;

/// Upper bound for a single backoff wait in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 10_000;

/// HTTP connect timeout (seconds)
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// HTTP request timeout (seconds)
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Retry policy for a single logical request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one; values below 1 are treated as 1
    pub max_attempts: u32,
    /// Base of the exponential backoff
    pub multiplier: Duration,
    /// Floor applied to every backoff wait
    pub min_backoff: Duration,
    /// Ceiling applied to every backoff wait
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Policy that retries without waiting between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            min_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Override the number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Effective attempt count
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait after the given failed attempt (1-based) before the next one
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.multiplier
            .saturating_mul(factor)
            .max(self.min_backoff)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            multiplier: Duration::from_millis(BACKOFF_MULTIPLIER_MS),
            min_backoff: Duration::from_millis(MIN_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
        }
    }
}

/// Runtime settings for the API side of the pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// API root, without trailing slash
    pub base_url: String,
    /// Delay before every request attempt
    pub request_delay: Duration,
    /// Extra delay before each county-level dataset request
    pub county_delay: Duration,
    /// Retry policy applied to every request
    pub retry: RetryPolicy,
    /// HTTP connect timeout
    pub connect_timeout: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl PipelineSettings {
    /// Settings with every delay and backoff set to zero
    pub fn without_delays() -> Self {
        Self {
            request_delay: Duration::ZERO,
            county_delay: Duration::ZERO,
            retry: RetryPolicy::immediate(MAX_ATTEMPTS),
            ..Self::default()
        }
    }

    /// Override the API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay: Duration::from_millis(REQUEST_DELAY_MS),
            county_delay: Duration::from_millis(COUNTY_DELAY_MS),
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS),
        }
    }
}
