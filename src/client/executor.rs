//! Rate-limited request executor for the HUD API
//!
//! Every dataset and listing request goes through [`RequestExecutor::execute`]:
//! - a fixed delay before each attempt
//! - bearer-token authentication
//! - retry with exponential backoff on any failure
//! - classification of the response payload into a [`DatasetRecord`]

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::config::{PipelineSettings, RetryPolicy};
use super::rate_limit::RequestThrottle;
use super::retry::{retry_with_policy, Classified, FailureKind};
use super::{RequestError, RequestResult};
use crate::metrics;
use crate::DatasetRecord;

/// Longest excerpt of an unexpected payload kept in error messages
const PAYLOAD_EXCERPT_CHARS: usize = 200;

/// Issues authenticated GET requests with pacing and retries
pub struct RequestExecutor {
    client: Client,
    token: String,
    throttle: RequestThrottle,
    retry: RetryPolicy,
}

impl RequestExecutor {
    /// Create an executor with its own HTTP client built from `settings`
    pub fn new(token: impl Into<String>, settings: &PipelineSettings) -> RequestResult<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| RequestError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(
            client,
            token,
            RequestThrottle::new(settings.request_delay),
            settings.retry,
        ))
    }

    /// Create an executor around an existing HTTP client
    pub fn with_client(
        client: Client,
        token: impl Into<String>,
        throttle: RequestThrottle,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            throttle,
            retry,
        }
    }

    /// Configured retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch `url` and return its normalized payload.
    ///
    /// # Errors
    /// Returns the classification of the last attempt once the retry policy
    /// is exhausted.
    pub async fn execute(&self, url: &str, params: &[(&str, String)]) -> RequestResult<DatasetRecord> {
        let result =
            retry_with_policy(&self.retry, |attempt| self.attempt(url, params, attempt)).await;

        if let Err(e) = &result {
            error!(
                url = %url,
                attempts = self.retry.attempts(),
                suggestion = e.kind().suggestion(),
                "Request failed after retries: {}",
                e
            );
        }
        result
    }

    async fn attempt(
        &self,
        url: &str,
        params: &[(&str, String)],
        attempt: u32,
    ) -> RequestResult<DatasetRecord> {
        self.throttle.wait().await;
        debug!(url = %url, attempt, params = params.len(), "Sending GET request");

        let mut request = self.client.get(url).bearer_auth(&self.token);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await.map_err(|e| {
            metrics::record_network_error();
            RequestError::Network(e.to_string())
        })?;
        let status = response.status();
        metrics::record_request(status.as_u16());

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, attempt, "Rate limit hit, backing off");
            return Err(RequestError::RateLimited);
        }

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            error!(url = %url, status = status.as_u16(), "Error response: {}", body);
            return Err(RequestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Network(e.to_string()))?;
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| RequestError::Decode(e.to_string()))?;

        classify_payload(value)
    }
}

/// Resolve a successful response body into a [`DatasetRecord`].
///
/// An object with a `data` key unwraps to [`DatasetRecord::Wrapped`], a bare
/// array becomes [`DatasetRecord::Bare`], anything else is rejected.
pub fn classify_payload(value: Value) -> RequestResult<DatasetRecord> {
    match value {
        Value::Array(items) => Ok(DatasetRecord::Bare(items)),
        Value::Object(mut fields) if fields.contains_key("data") => {
            let data = fields.remove("data").unwrap_or(Value::Null);
            Ok(DatasetRecord::Wrapped(data))
        }
        other => {
            let excerpt: String = other
                .to_string()
                .chars()
                .take(PAYLOAD_EXCERPT_CHARS)
                .collect();
            error!("Unexpected response structure: {}", excerpt);
            Err(RequestError::UnexpectedShape(excerpt))
        }
    }
}

impl Classified for RequestError {
    fn kind(&self) -> FailureKind {
        match self {
            RequestError::RateLimited => FailureKind::RateLimit,
            RequestError::UnexpectedShape(_) => FailureKind::UnexpectedShape,
            RequestError::Decode(_) => FailureKind::Decode,
            RequestError::Status { status, .. } => FailureKind::from_status(*status),
            RequestError::Network(_) => FailureKind::Network,
        }
    }
}
