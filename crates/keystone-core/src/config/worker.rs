//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic refresh-token sweeper.
///
/// Expired refresh tokens are rejected lazily on use; the sweeper only
/// keeps the table from accumulating dead rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the cleanup loop runs at all.
    #[serde(default = "default_true")]
    pub cleanup_enabled: bool,
    /// Seconds between cleanup sweeps.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cleanup_enabled: true,
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cleanup_interval() -> u64 {
    3600
}
