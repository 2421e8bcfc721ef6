//! Tunables for the planner state machine.

use std::time::Duration;

use planboard_core::AppConfig;

#[derive(Debug, Clone)]
pub struct PlannerOptions {
    /// How long the "refreshing" overlay stays up after a deletion.
    pub refresh_settle: Duration,
    pub toast_ttl: Duration,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            refresh_settle: Duration::from_millis(500),
            toast_ttl: Duration::from_secs(6),
        }
    }
}

impl From<&AppConfig> for PlannerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            refresh_settle: config.refresh_settle(),
            toast_ttl: config.toast_ttl(),
        }
    }
}
