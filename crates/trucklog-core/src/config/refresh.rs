//! Domain refresh (polling) configuration.

use serde::{Deserialize, Serialize};

/// Refresh controller configuration, shared by the HOS and trip controllers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Whether interval-driven auto refresh is enabled.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    /// Interval between refresh ticks in seconds.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Minimum time between actual fetches in seconds, measured from the
    /// last fetch regardless of how the timer fires.
    #[serde(default = "default_min_fetch_interval")]
    pub min_fetch_interval_seconds: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            interval_seconds: default_interval(),
            min_fetch_interval_seconds: default_min_fetch_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    60
}

fn default_min_fetch_interval() -> u64 {
    30
}
