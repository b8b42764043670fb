//! HUD API endpoint layout
//!
//! Listing endpoints live under `/fmr`; dataset endpoints are addressed by the
//! dataset's API segment (`fmr` or `il`) and either an entity id (county FIPS
//! or metro CBSA code) or a state code:
//!
//! - `/{segment}/data/{entity_id}`
//! - `/{segment}/statedata/{state_code}`

use crate::Dataset;

/// States listing path
pub const LIST_STATES_PATH: &str = "/fmr/listStates";

/// Counties listing path prefix (followed by `/{state_code}`)
pub const LIST_COUNTIES_PATH: &str = "/fmr/listCounties";

/// Metro areas listing path
pub const LIST_METRO_AREAS_PATH: &str = "/fmr/listMetroAreas";

/// URL builder rooted at an API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudEndpoints {
    base_url: String,
}

impl HudEndpoints {
    /// Create a builder; a trailing slash on `base_url` is dropped
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// API root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the states listing
    pub fn list_states(&self) -> String {
        format!("{}{}", self.base_url, LIST_STATES_PATH)
    }

    /// URL of the counties listing for a state
    pub fn list_counties(&self, state_code: &str) -> String {
        format!("{}{}/{}", self.base_url, LIST_COUNTIES_PATH, state_code)
    }

    /// URL of the metro areas listing
    pub fn list_metro_areas(&self) -> String {
        format!("{}{}", self.base_url, LIST_METRO_AREAS_PATH)
    }

    /// URL of a dataset for a single entity
    pub fn entity_data(&self, dataset: Dataset, entity_id: &str) -> String {
        format!("{}/{}/data/{}", self.base_url, dataset.api_segment(), entity_id)
    }

    /// URL of a dataset for a whole state
    pub fn state_data(&self, dataset: Dataset, state_code: &str) -> String {
        format!(
            "{}/{}/statedata/{}",
            self.base_url,
            dataset.api_segment(),
            state_code
        )
    }
}
