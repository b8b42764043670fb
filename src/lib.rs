//! # Housing Data Pipeline Library
//!
//! Fetches public housing-market datasets from the HUD User API and stores
//! them on the local filesystem or in cloud object storage.
//!
//! ## Features
//!
//! - **Datasets**: Fair Market Rents and Income Limits, at state and county level
//! - **Listings**: states, counties of a state, metropolitan areas
//! - **Rate Limiting**: a fixed delay before every request plus extra spacing
//!   between county-level requests
//! - **Retry**: bounded exponential backoff through an explicit [`client::RetryPolicy`]
//! - **Partial Failure**: one county failing never aborts the rest of its state
//! - **Sinks**: local JSON, remote JSON and remote Parquet
//! - **Verification**: list and preview stored blobs
//!
//! ## Quick Start
//!
//! ```no_run
//! use housing_data_pipeline::client::{PipelineSettings, RequestExecutor};
//! use housing_data_pipeline::fetcher::HudClient;
//! use housing_data_pipeline::output::{LocalJsonSink, RemoteSinks};
//! use housing_data_pipeline::pipeline::StateProcessor;
//! use housing_data_pipeline::StorageMode;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = PipelineSettings::default();
//! let executor = RequestExecutor::new("my-token", &settings)?;
//! let source = Arc::new(HudClient::new(executor, settings.base_url.clone()));
//!
//! let processor = StateProcessor::new(
//!     source,
//!     settings.county_delay,
//!     LocalJsonSink::new("data"),
//!     RemoteSinks::disconnected(),
//! );
//! processor.process_state("TX", 2024, StorageMode::Local).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`client`] - rate-limited request executor and retry policy
//! - [`fetcher`] - typed HUD API accessors behind the [`fetcher::DataSource`] trait
//! - [`pipeline`] - county aggregation and per-state processing
//! - [`output`] - local and remote package sinks
//! - [`verify`] - stored blob listing and previews
//! - [`mock`] - synthetic CRM/ERP records for demos
//! - [`config`] - credentials and storage connection parsing

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// CLI command implementations
pub mod cli;

/// Rate-limited request execution
pub mod client;

/// Credentials and connection configuration
pub mod config;

/// HUD API resource fetchers
pub mod fetcher;

/// Observability metrics
pub mod metrics;

/// Synthetic CRM/ERP data generation
pub mod mock;

/// Package sinks
pub mod output;

/// County aggregation and state processing
pub mod pipeline;

/// Stored blob verification
pub mod verify;

/// Payload returned by a dataset endpoint.
///
/// The API answers either with an envelope `{"data": ...}` or with a bare
/// array. The shape is resolved once by the request executor; the rest of
/// the crate only sees the payload. Serialization writes the payload alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetRecord {
    /// A bare ordered sequence of records
    Bare(Vec<Value>),
    /// The value found under the envelope's `data` key
    Wrapped(Value),
}

impl DatasetRecord {
    /// Whether the payload carries no data at all
    pub fn is_empty(&self) -> bool {
        match self {
            DatasetRecord::Bare(items) => items.is_empty(),
            DatasetRecord::Wrapped(Value::Null) => true,
            DatasetRecord::Wrapped(Value::Array(items)) => items.is_empty(),
            DatasetRecord::Wrapped(Value::Object(fields)) => fields.is_empty(),
            DatasetRecord::Wrapped(_) => false,
        }
    }

    /// Consume the record and return its payload as a JSON value
    pub fn into_value(self) -> Value {
        match self {
            DatasetRecord::Bare(items) => Value::Array(items),
            DatasetRecord::Wrapped(value) => value,
        }
    }
}

// Equality compares payloads only; the variant records where the payload came from.
impl PartialEq for DatasetRecord {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DatasetRecord::Bare(a), DatasetRecord::Bare(b)) => a == b,
            (DatasetRecord::Wrapped(a), DatasetRecord::Wrapped(b)) => a == b,
            (DatasetRecord::Bare(items), DatasetRecord::Wrapped(Value::Array(other)))
            | (DatasetRecord::Wrapped(Value::Array(other)), DatasetRecord::Bare(items)) => {
                items == other
            }
            _ => false,
        }
    }
}

/// State listing entry from `/fmr/listStates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Two-letter state code (e.g., "TX")
    pub state_code: String,
    /// Full state name
    pub state_name: String,
    /// Remaining fields as returned by the API
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// County listing entry from `/fmr/listCounties/{state}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct County {
    /// County FIPS code, used as the entity id for county-level datasets
    pub fips_code: String,
    /// County display name
    pub county_name: String,
    /// Remaining fields as returned by the API
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Metropolitan area listing entry from `/fmr/listMetroAreas`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetroArea {
    /// CBSA code, used as the entity id for metro-level datasets
    pub cbsa_code: String,
    /// Metro area display name
    pub area_name: String,
    /// Remaining fields as returned by the API
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Both datasets for a single county
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyPackage {
    /// County listing entry the datasets were fetched for
    pub county_info: County,
    /// County-level Fair Market Rents
    pub fair_market_rents: DatasetRecord,
    /// County-level Income Limits
    pub income_limits: DatasetRecord,
}

/// One dataset for one state and year, with the county aggregate attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePackage {
    /// State-level payload of the dataset
    pub state_level: DatasetRecord,
    /// Successfully fetched counties, in API order
    pub counties: Vec<CountyPackage>,
}

impl StatePackage {
    /// A package is empty when it has neither state-level data nor counties
    pub fn is_empty(&self) -> bool {
        self.state_level.is_empty() && self.counties.is_empty()
    }
}

/// Dataset published by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// Fair Market Rents
    FairMarketRents,
    /// Income Limits
    IncomeLimits,
}

impl Dataset {
    /// All datasets in processing order
    pub const ALL: [Dataset; 2] = [Dataset::FairMarketRents, Dataset::IncomeLimits];

    /// Storage name used in local paths and blob keys
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::FairMarketRents => "fair_market_rents",
            Dataset::IncomeLimits => "income_limits",
        }
    }

    /// API path segment for the dataset's endpoints
    pub fn api_segment(&self) -> &'static str {
        match self {
            Dataset::FairMarketRents => "fmr",
            Dataset::IncomeLimits => "il",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fair_market_rents" | "fmr" => Ok(Dataset::FairMarketRents),
            "income_limits" | "il" => Ok(Dataset::IncomeLimits),
            _ => Err(format!("Invalid dataset: {s}")),
        }
    }
}

/// Where processed packages are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Local JSON files only
    Local,
    /// Remote JSON and Parquet blobs only
    #[default]
    Remote,
    /// Local files and remote blobs
    Both,
}

impl StorageMode {
    /// Whether packages go to the local JSON sink
    pub fn writes_local(&self) -> bool {
        matches!(self, StorageMode::Local | StorageMode::Both)
    }

    /// Whether packages go to the remote sinks
    pub fn writes_remote(&self) -> bool {
        matches!(self, StorageMode::Remote | StorageMode::Both)
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StorageMode::Local => "local",
            StorageMode::Remote => "remote",
            StorageMode::Both => "both",
        };
        write!(f, "{s}")
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageMode::Local),
            "remote" | "azure" => Ok(StorageMode::Remote),
            "both" => Ok(StorageMode::Both),
            _ => Err(format!(
                "Invalid storage mode: {s}. Valid options: local, remote, both"
            )),
        }
    }
}
