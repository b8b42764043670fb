//! County aggregation and per-state processing
//!
//! [`StateProcessor::process_state`] is the unit of work the `fetch` command
//! runs for every configured state:
//!
//! 1. fetch state-level Fair Market Rents and Income Limits
//! 2. collect both datasets for every county through the [`CountyAggregator`]
//! 3. build one [`StatePackage`](crate::StatePackage) per dataset
//! 4. hand each package to the sinks selected by the [`StorageMode`](crate::StorageMode)

use crate::fetcher::FetchError;
use crate::output::SinkError;

pub mod aggregator;
pub mod processor;

pub use aggregator::{CountyAggregate, CountyAggregator, CountyFailure};
pub use processor::StateProcessor;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// State-level or county-listing fetch failed
    #[error("error processing state {state}: {source}")]
    Processing {
        /// State code being processed
        state: String,
        /// Underlying fetch failure
        #[source]
        source: FetchError,
    },

    /// First sink failure of the state
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
