//! County-level collection for a single state

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::client::RequestThrottle;
use crate::fetcher::{DataSource, DatasetQuery, FetchError, FetchResult};
use crate::{metrics, County, CountyPackage, DatasetRecord};

/// County whose datasets could not be fetched
#[derive(Debug)]
pub struct CountyFailure {
    /// FIPS code of the county
    pub fips_code: String,
    /// County display name
    pub county_name: String,
    /// Failure that dropped the county
    pub error: FetchError,
}

/// Outcome of collecting one state's counties
#[derive(Debug, Default)]
pub struct CountyAggregate {
    /// Counties fetched successfully, in API order
    pub packages: Vec<CountyPackage>,
    /// Counties dropped from the aggregate
    pub failures: Vec<CountyFailure>,
}

/// Collects both datasets for every county of a state
///
/// County requests are spaced by an extra delay on top of the executor's own
/// pacing. A county whose fetch fails is logged and left out; it never fails
/// the state.
pub struct CountyAggregator {
    source: Arc<dyn DataSource>,
    throttle: RequestThrottle,
}

impl CountyAggregator {
    /// Create an aggregator waiting `county_delay` before each county request
    pub fn new(source: Arc<dyn DataSource>, county_delay: Duration) -> Self {
        Self {
            source,
            throttle: RequestThrottle::new(county_delay),
        }
    }

    /// Successfully fetched county packages, in API order
    ///
    /// # Errors
    /// Only when the county listing itself cannot be fetched
    pub async fn get_county_data(&self, state_code: &str, year: u16) -> FetchResult<Vec<CountyPackage>> {
        Ok(self.collect_county_data(state_code, year).await?.packages)
    }

    /// County packages together with the counties that failed
    pub async fn collect_county_data(&self, state_code: &str, year: u16) -> FetchResult<CountyAggregate> {
        let counties = self.source.get_counties(state_code).await?;
        let total = counties.len();
        let mut aggregate = CountyAggregate::default();

        for county in counties {
            match self.fetch_county(&county, year).await {
                Ok((fair_market_rents, income_limits)) => {
                    info!(
                        state = state_code,
                        county = %county.county_name,
                        fips = %county.fips_code,
                        "Fetched county data"
                    );
                    aggregate.packages.push(CountyPackage {
                        county_info: county,
                        fair_market_rents,
                        income_limits,
                    });
                }
                Err(e) => {
                    error!(
                        state = state_code,
                        county = %county.county_name,
                        fips = %county.fips_code,
                        "Error fetching data for county: {}",
                        e
                    );
                    metrics::record_county_failure(state_code);
                    aggregate.failures.push(CountyFailure {
                        fips_code: county.fips_code,
                        county_name: county.county_name,
                        error: e,
                    });
                }
            }
        }

        info!(
            state = state_code,
            total,
            fetched = aggregate.packages.len(),
            failed = aggregate.failures.len(),
            "County collection finished"
        );
        Ok(aggregate)
    }

    async fn fetch_county(
        &self,
        county: &County,
        year: u16,
    ) -> FetchResult<(DatasetRecord, DatasetRecord)> {
        let query = DatasetQuery::for_entity(county.fips_code.as_str()).with_year(year);

        self.throttle.wait().await;
        let fair_market_rents = self.source.get_fair_market_rents(&query).await?;

        self.throttle.wait().await;
        let income_limits = self.source.get_income_limits(&query).await?;

        Ok((fair_market_rents, income_limits))
    }
}
