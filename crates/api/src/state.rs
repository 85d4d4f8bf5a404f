//! Application state for the API server.

use komando_coordinator::{Coordinator, CoordinatorConfig};
use std::sync::Arc;

/// Shared application state for the API server.
pub struct AppState {
    /// The coordinator owning the conversation
    pub coordinator: Arc<Coordinator>,

    /// Server start time (for health checks)
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state with the given coordinator configuration.
    pub fn new(config: &CoordinatorConfig) -> Self {
        Self::with_coordinator(Arc::new(Coordinator::new(config)))
    }

    /// Wrap an already constructed coordinator.
    pub fn with_coordinator(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
