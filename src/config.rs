//! Credentials and storage connection configuration
//!
//! Values come from CLI flags or their environment fallbacks
//! (`HUD_API_TOKEN`, `AZURE_CONNECTION_STRING`); `main` loads a `.env` file
//! before arguments are parsed. Missing values are rejected here, before any
//! network activity.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Environment variable holding the HUD API bearer token
pub const API_TOKEN_ENV: &str = "HUD_API_TOKEN";

/// Environment variable holding the Azure storage connection string
pub const CONNECTION_STRING_ENV: &str = "AZURE_CONNECTION_STRING";

/// Blob container all pipeline output is written to
pub const DEFAULT_CONTAINER: &str = "raw-data";

/// Default endpoint suffix of Azure public cloud storage accounts
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required setting absent or blank
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// Connection string could not be parsed
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Object store client could not be built
    #[error("storage configuration error: {0}")]
    Storage(String),
}

/// Return the trimmed value, or [`ConfigError::Missing`] naming `name`
pub fn require(value: Option<&str>, name: &'static str) -> Result<String, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing(name))
}

/// Bearer token for the HUD API
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Validate a token taken from flags or the environment
    pub fn from_setting(value: Option<&str>) -> Result<Self, ConfigError> {
        require(value, API_TOKEN_ENV).map(Self)
    }

    /// Raw token for the `Authorization` header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Parsed Azure storage connection string
/// (`Key=Value;Key=Value`, keys case-insensitive)
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ConnectionString {
    /// `AccountName`
    pub account_name: Option<String>,
    /// `AccountKey`
    pub account_key: Option<String>,
    /// `DefaultEndpointsProtocol`
    pub protocol: Option<String>,
    /// `EndpointSuffix`
    pub endpoint_suffix: Option<String>,
    /// `BlobEndpoint`
    pub blob_endpoint: Option<String>,
    /// `UseDevelopmentStorage=true` (Azurite emulator)
    pub use_development_storage: bool,
}

impl ConnectionString {
    /// Read and parse a connection string taken from flags or the environment
    pub fn from_setting(value: Option<&str>) -> Result<Self, ConfigError> {
        require(value, CONNECTION_STRING_ENV)?.parse()
    }

    /// Explicit blob endpoint, if the connection string implies a non-default one
    pub fn custom_blob_endpoint(&self) -> Option<String> {
        if let Some(endpoint) = &self.blob_endpoint {
            return Some(endpoint.trim_end_matches('/').to_string());
        }
        let suffix = self.endpoint_suffix.as_deref()?;
        if suffix == DEFAULT_ENDPOINT_SUFFIX {
            return None;
        }
        let account = self.account_name.as_deref()?;
        let protocol = self.protocol.as_deref().unwrap_or("https");
        Some(format!("{protocol}://{account}.blob.{suffix}"))
    }
}

impl FromStr for ConnectionString {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = HashMap::new();
        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            // Account keys are base64 and may end in '=', so split on the first one only
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                ConfigError::InvalidConnectionString(format!("segment without '=': {segment}"))
            })?;
            fields.insert(key.trim().to_lowercase(), value.trim().to_string());
        }

        let use_development_storage = fields
            .get("usedevelopmentstorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let parsed = Self {
            account_name: fields.remove("accountname"),
            account_key: fields.remove("accountkey"),
            protocol: fields.remove("defaultendpointsprotocol"),
            endpoint_suffix: fields.remove("endpointsuffix"),
            blob_endpoint: fields.remove("blobendpoint"),
            use_development_storage,
        };

        if !parsed.use_development_storage
            && (parsed.account_name.is_none() || parsed.account_key.is_none())
        {
            return Err(ConfigError::InvalidConnectionString(
                "AccountName and AccountKey are required".to_string(),
            ));
        }
        Ok(parsed)
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_ref().map(|_| "***"))
            .field("protocol", &self.protocol)
            .field("endpoint_suffix", &self.endpoint_suffix)
            .field("blob_endpoint", &self.blob_endpoint)
            .field("use_development_storage", &self.use_development_storage)
            .finish()
    }
}
