//! Per-state processing and sink routing

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::{CountyAggregator, PipelineError, PipelineResult};
use crate::fetcher::{DataSource, DatasetQuery};
use crate::metrics::{self, StateRunMetrics};
use crate::output::{LocalJsonSink, PackageLocation, PackageSink, RemoteSinks, SinkError};
use crate::{Dataset, StatePackage, StorageMode};

/// Fetches one state's datasets and stores them
pub struct StateProcessor {
    source: Arc<dyn DataSource>,
    aggregator: CountyAggregator,
    local: LocalJsonSink,
    remote: RemoteSinks,
}

impl StateProcessor {
    /// Create a processor
    ///
    /// `county_delay` spaces the county-level requests of the aggregator.
    pub fn new(
        source: Arc<dyn DataSource>,
        county_delay: Duration,
        local: LocalJsonSink,
        remote: RemoteSinks,
    ) -> Self {
        Self {
            aggregator: CountyAggregator::new(source.clone(), county_delay),
            source,
            local,
            remote,
        }
    }

    /// Fetch state-level data and the county aggregate, and build one
    /// package per dataset in [`Dataset::ALL`] order
    ///
    /// # Errors
    /// [`PipelineError::Processing`] if a state-level fetch or the county
    /// listing fails. Individual county failures are not errors.
    pub async fn build_packages(
        &self,
        state_code: &str,
        year: u16,
    ) -> PipelineResult<Vec<(Dataset, StatePackage)>> {
        let processing = |source| PipelineError::Processing {
            state: state_code.to_string(),
            source,
        };

        let query = DatasetQuery::for_state(state_code).with_year(year);
        let fair_market_rents = self
            .source
            .get_fair_market_rents(&query)
            .await
            .map_err(processing)?;
        let income_limits = self
            .source
            .get_income_limits(&query)
            .await
            .map_err(processing)?;

        let aggregate = self
            .aggregator
            .collect_county_data(state_code, year)
            .await
            .map_err(processing)?;
        if !aggregate.failures.is_empty() {
            info!(
                state = state_code,
                failed = aggregate.failures.len(),
                "Some counties were skipped"
            );
        }

        let counties = aggregate.packages;
        Ok(vec![
            (
                Dataset::FairMarketRents,
                StatePackage {
                    state_level: fair_market_rents,
                    counties: counties.clone(),
                },
            ),
            (
                Dataset::IncomeLimits,
                StatePackage {
                    state_level: income_limits,
                    counties,
                },
            ),
        ])
    }

    /// Fetch and store both datasets of a state
    ///
    /// Every selected (sink, package) pair is attempted once, sinks in the
    /// order local JSON, remote JSON, remote Parquet. The first sink failure
    /// is returned after all attempts.
    pub async fn process_state(
        &self,
        state_code: &str,
        year: u16,
        mode: StorageMode,
    ) -> PipelineResult<()> {
        let run = StateRunMetrics::start(state_code, year);

        let packages = match self.build_packages(state_code, year).await {
            Ok(packages) => packages,
            Err(e) => {
                run.record_failure(&e.to_string());
                return Err(e);
            }
        };
        let counties = packages
            .first()
            .map(|(_, package)| package.counties.len())
            .unwrap_or(0);

        let mut first_failure: Option<SinkError> = None;
        for sink in self.sinks_for(mode) {
            for (dataset, package) in &packages {
                let location = PackageLocation::new(*dataset, year, state_code);
                match sink.store(package, &location).await {
                    Ok(()) => metrics::record_package_stored(sink.name()),
                    Err(e) => {
                        error!(
                            sink = sink.name(),
                            location = %location,
                            "Failed to store package: {}",
                            e
                        );
                        metrics::record_package_failed(sink.name());
                        first_failure.get_or_insert(e);
                    }
                }
            }
        }

        match first_failure {
            Some(e) => {
                run.record_failure(&e.to_string());
                Err(PipelineError::Sink(e))
            }
            None => {
                run.record_success(counties);
                Ok(())
            }
        }
    }

    fn sinks_for(&self, mode: StorageMode) -> Vec<&dyn PackageSink> {
        let mut sinks: Vec<&dyn PackageSink> = Vec::with_capacity(3);
        if mode.writes_local() {
            sinks.push(&self.local);
        }
        if mode.writes_remote() {
            sinks.push(&self.remote.json);
            sinks.push(&self.remote.parquet);
        }
        sinks
    }
}
