//! Application state shared with request handlers.

use cryptowatch_engine::PriceMonitor;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub monitor: PriceMonitor,
    started_at: Instant,
}

impl AppState {
    pub fn new(monitor: PriceMonitor) -> Self {
        Self {
            monitor,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Thread-safe shared state.
pub type SharedState = Arc<AppState>;

/// Create shared state around a monitor.
pub fn create_state(monitor: PriceMonitor) -> SharedState {
    Arc::new(AppState::new(monitor))
}
