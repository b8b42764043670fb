//! Pipeline observability metrics
//!
//! Counters for API traffic, retries, county failures and sink outcomes.
//!
//! ## Architecture
//!
//! - Uses the `metrics` crate facade; recording is a no-op until a recorder
//!   is installed
//! - [`init_metrics`] installs a Prometheus exporter serving `/metrics`
//!   on the given address (`fetch --metrics-addr 0.0.0.0:9090`)

use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent: later calls return `Ok(())` without rebinding.
///
/// # Arguments
/// * `addr` - Socket address to bind the scrape endpoint (e.g., "0.0.0.0:9090")
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "hud_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the HUD API"
    );

    describe_counter!(
        "hud_request_retries_total",
        Unit::Count,
        "Total number of retried HUD API requests"
    );

    describe_counter!(
        "hud_counties_failed_total",
        Unit::Count,
        "Counties skipped after their datasets could not be fetched"
    );

    describe_counter!(
        "packages_stored_total",
        Unit::Count,
        "State packages written by a sink"
    );

    describe_counter!(
        "packages_failed_total",
        Unit::Count,
        "State packages a sink failed to write"
    );

    *initialized = true;
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Check if metrics system is initialized
pub async fn is_initialized() -> bool {
    *METRICS_INITIALIZED.read().await
}

/// Record a completed HUD API request
pub fn record_request(status_code: u16) {
    counter!("hud_requests_total", "status" => status_code.to_string()).increment(1);
}

/// Record a request that failed before a status was received
pub fn record_network_error() {
    counter!("hud_requests_total", "status" => "network_error").increment(1);
}

/// Record a retry, labelled with the failure that caused it
pub fn record_retry(reason: &str) {
    counter!("hud_request_retries_total", "reason" => reason.to_string()).increment(1);
}

/// Record a county dropped from its state's aggregate
pub fn record_county_failure(state_code: &str) {
    counter!("hud_counties_failed_total", "state" => state_code.to_string()).increment(1);
}

/// Record a package written by `sink`
pub fn record_package_stored(sink: &'static str) {
    counter!("packages_stored_total", "sink" => sink).increment(1);
}

/// Record a package `sink` failed to write
pub fn record_package_failed(sink: &'static str) {
    counter!("packages_failed_total", "sink" => sink).increment(1);
}

/// Timing and outcome logging for one state run
pub struct StateRunMetrics {
    state: String,
    year: u16,
    start_time: Instant,
}

impl StateRunMetrics {
    /// Start tracking a state
    pub fn start(state: impl Into<String>, year: u16) -> Self {
        let state = state.into();
        info!(state = %state, year, "Processing state");
        Self {
            state,
            year,
            start_time: Instant::now(),
        }
    }

    /// Record a state whose packages were all stored
    pub fn record_success(&self, counties: usize) {
        info!(
            state = %self.state,
            year = self.year,
            counties,
            duration_secs = self.start_time.elapsed().as_secs(),
            "Successfully processed data"
        );
    }

    /// Record a failed state
    pub fn record_failure(&self, error: &str) {
        error!(
            state = %self.state,
            year = self.year,
            error = %error,
            duration_secs = self.start_time.elapsed().as_secs(),
            "Error processing state"
        );
    }
}
