//! Core data types for page interactions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed per-interaction timeouts applied to every driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTimeouts {
    /// fill / click / wait-for / text lookups (milliseconds)
    pub action_ms: u64,

    /// Page navigation (milliseconds)
    pub navigation_ms: u64,

    /// Network-idle wait after navigation (milliseconds)
    pub network_idle_ms: u64,
}

impl Default for InteractionTimeouts {
    fn default() -> Self {
        Self {
            action_ms: 3000,
            navigation_ms: 30_000,
            network_idle_ms: 10_000,
        }
    }
}

impl InteractionTimeouts {
    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }
}
