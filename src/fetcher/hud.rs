//! [`DataSource`] backed by the HUD User REST API

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{DataSource, DatasetQuery, FetchError, FetchResult, HudEndpoints, QueryTarget};
use crate::client::RequestExecutor;
use crate::{County, Dataset, DatasetRecord, MetroArea, State};

/// HUD API client
pub struct HudClient {
    executor: RequestExecutor,
    endpoints: HudEndpoints,
}

impl HudClient {
    /// Create a client issuing requests through `executor` against `base_url`
    pub fn new(executor: RequestExecutor, base_url: impl Into<String>) -> Self {
        Self {
            executor,
            endpoints: HudEndpoints::new(base_url),
        }
    }

    /// Endpoint builder in use
    pub fn endpoints(&self) -> &HudEndpoints {
        &self.endpoints
    }

    async fn fetch_listing<T: DeserializeOwned>(&self, url: &str) -> FetchResult<Vec<T>> {
        let payload = self.executor.execute(url, &[]).await?.into_value();
        serde_json::from_value(payload)
            .map_err(|e| FetchError::Parse(format!("failed to decode listing from {url}: {e}")))
    }
}

#[async_trait]
impl DataSource for HudClient {
    async fn get_states(&self) -> FetchResult<Vec<State>> {
        self.fetch_listing(&self.endpoints.list_states()).await
    }

    async fn get_counties(&self, state_code: &str) -> FetchResult<Vec<County>> {
        let url = self.endpoints.list_counties(state_code);
        let payload = self.executor.execute(&url, &[]).await?.into_value();

        let Value::Array(entries) = payload else {
            return Err(FetchError::Parse(format!(
                "county listing for {state_code} is not an array"
            )));
        };

        // A malformed entry only loses that county.
        let counties = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<County>(entry) {
                Ok(county) => Some(county),
                Err(e) => {
                    warn!(state = state_code, index, "Skipping malformed county entry: {}", e);
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!(state = state_code, count = counties.len(), "Listed counties");
        Ok(counties)
    }

    async fn get_metro_areas(&self) -> FetchResult<Vec<MetroArea>> {
        self.fetch_listing(&self.endpoints.list_metro_areas()).await
    }

    async fn get_dataset(
        &self,
        dataset: Dataset,
        query: &DatasetQuery,
    ) -> FetchResult<DatasetRecord> {
        let url = match query.target()? {
            QueryTarget::Entity(entity_id) => self.endpoints.entity_data(dataset, entity_id),
            QueryTarget::State(state_code) => self.endpoints.state_data(dataset, state_code),
        };
        let record = self.executor.execute(&url, &query.params()).await?;
        Ok(record)
    }
}
