//! Fixed-delay request pacing
//!
//! The HUD API publishes no weight or quota headers, so pacing is a plain
//! sleep before each request rather than a token bucket.

use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;

/// Sleeps a fixed delay before every request it guards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestThrottle {
    delay: Duration,
}

impl RequestThrottle {
    /// Create a throttle with the given delay
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Throttle that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the configured delay
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        trace!(delay_ms = self.delay.as_millis() as u64, "Throttling request");
        sleep(self.delay).await;
    }
}
