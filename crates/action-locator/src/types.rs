//! Core types for selector healing

use crate::errors::HealError;
use autoprobe_core_types::StepAction;
use serde::{Deserialize, Serialize};

/// Healer tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealerConfig {
    /// Characters of live DOM sent to the suggestion service
    pub dom_snapshot_chars: usize,
}

impl Default for HealerConfig {
    fn default() -> Self {
        Self {
            dom_snapshot_chars: 4000,
        }
    }
}

/// Context handed to the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub action: String,
    pub selector: String,
    pub error_detail: String,
    /// Size-bounded DOM captured right after the failure
    pub dom_snapshot: String,
}

/// A failed interaction eligible for one healing attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealRequest {
    pub action: StepAction,
    pub selector: String,
    /// Fill value for `type`; ignored for `click`
    pub value: Option<String>,
    pub error_detail: String,
}

impl HealRequest {
    pub fn new(
        action: StepAction,
        selector: impl Into<String>,
        value: Option<String>,
        error_detail: impl Into<String>,
    ) -> Self {
        Self {
            action,
            selector: selector.into(),
            value,
            error_detail: error_detail.into(),
        }
    }
}

/// Result of the single healing attempt for a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealOutcome {
    /// Retry with the suggested selector succeeded
    Healed { selector: String },

    /// Step stays failed
    Failed {
        reason: HealError,
        /// Selector proposed by the service, if one was extracted
        suggested: Option<String>,
    },
}

impl HealOutcome {
    fn failed(reason: HealError) -> Self {
        HealOutcome::Failed {
            reason,
            suggested: None,
        }
    }
}

impl From<HealError> for HealOutcome {
    fn from(reason: HealError) -> Self {
        HealOutcome::failed(reason)
    }
}
