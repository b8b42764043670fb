//! HUD API resource fetchers

use crate::client::RequestError;
use crate::{County, Dataset, DatasetRecord, MetroArea, State};
use async_trait::async_trait;

pub mod endpoints;
pub mod hud;

pub use endpoints::HudEndpoints;
pub use hud::HudClient;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Caller supplied neither a state code nor an entity id
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Request failed after exhausting retries
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Listing payload could not be decoded
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for fetcher operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Parameters of a dataset request.
///
/// At least one of `state` and `entity_id` must be present; when both are,
/// the entity id wins. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetQuery {
    /// Two-letter state code for state-level data
    pub state: Option<String>,
    /// County FIPS or metro CBSA code for entity-level data
    pub entity_id: Option<String>,
    /// Publication year, sent as the `year` query parameter
    pub year: Option<u16>,
}

/// Resolved addressing of a [`DatasetQuery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTarget<'a> {
    /// A single county or metro area
    Entity(&'a str),
    /// A whole state
    State(&'a str),
}

impl DatasetQuery {
    /// Query for state-level data
    pub fn for_state(state_code: impl Into<String>) -> Self {
        Self {
            state: Some(state_code.into()),
            ..Self::default()
        }
    }

    /// Query for a single county or metro area
    pub fn for_entity(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    /// Restrict the query to a publication year
    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    /// Resolve which endpoint the query addresses
    ///
    /// # Errors
    /// [`FetchError::InvalidArgument`] when neither identifier is present
    pub fn target(&self) -> FetchResult<QueryTarget<'_>> {
        fn present(value: &Option<String>) -> Option<&str> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
        }

        if let Some(entity_id) = present(&self.entity_id) {
            return Ok(QueryTarget::Entity(entity_id));
        }
        if let Some(state) = present(&self.state) {
            return Ok(QueryTarget::State(state));
        }
        Err(FetchError::InvalidArgument(
            "Either state code or entity_id must be provided".to_string(),
        ))
    }

    /// Query string parameters
    pub fn params(&self) -> Vec<(&'static str, String)> {
        self.year
            .map(|year| vec![("year", year.to_string())])
            .unwrap_or_default()
    }
}

/// Source of HUD listings and datasets
#[async_trait]
pub trait DataSource: Send + Sync {
    /// List all states
    async fn get_states(&self) -> FetchResult<Vec<State>>;

    /// List the counties of a state, in API order
    async fn get_counties(&self, state_code: &str) -> FetchResult<Vec<County>>;

    /// List all metropolitan areas
    async fn get_metro_areas(&self) -> FetchResult<Vec<MetroArea>>;

    /// Fetch a dataset for a state or entity
    ///
    /// # Errors
    /// Fails with [`FetchError::InvalidArgument`] before any request when the
    /// query has neither a state code nor an entity id
    async fn get_dataset(&self, dataset: Dataset, query: &DatasetQuery)
        -> FetchResult<DatasetRecord>;

    /// Fetch Fair Market Rents
    async fn get_fair_market_rents(&self, query: &DatasetQuery) -> FetchResult<DatasetRecord> {
        self.get_dataset(Dataset::FairMarketRents, query).await
    }

    /// Fetch Income Limits
    async fn get_income_limits(&self, query: &DatasetQuery) -> FetchResult<DatasetRecord> {
        self.get_dataset(Dataset::IncomeLimits, query).await
    }
}
