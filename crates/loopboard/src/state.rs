//! Application state for the dashboard server.

use crate::config::DashboardConfig;
use crate::hub::EventHub;

/// Shared application state.
pub struct AppState {
    /// Snapshot + subscriber hub; the only holder of run state.
    pub hub: EventHub,
    /// Dashboard configuration.
    pub config: DashboardConfig,
}

impl AppState {
    /// Create a new application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::default())
    }

    /// Create application state with custom configuration.
    pub fn with_config(config: DashboardConfig) -> Self {
        Self {
            hub: EventHub::new(),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
