//! Error types for selector healing

use thiserror::Error;

/// Failure reported by a selector suggestion service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SuggestError {
    /// Service could not be reached or the request failed in transit
    #[error("suggestion service unreachable: {0}")]
    Unavailable(String),

    /// Service answered with an error status
    #[error("suggestion service rejected request: {0}")]
    Rejected(String),

    /// Service answered without usable content
    #[error("suggestion service returned no content")]
    EmptyResponse,
}

/// Reasons a healing attempt did not recover a step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HealError {
    /// DOM snapshot could not be taken after the failure
    #[error("DOM snapshot unavailable: {0}")]
    Snapshot(String),

    /// Suggestion service failed
    #[error("healing unavailable: {0}")]
    Service(#[from] SuggestError),

    /// Response carried no well-formed JSON object
    #[error("no JSON object in suggestion response")]
    NoJson,

    /// JSON object lacked a usable `selector` string
    #[error("suggestion response has no usable selector")]
    MissingSelector,

    /// Retry with the suggested selector failed too
    #[error("retry with suggested selector failed: {0}")]
    RetryFailed(String),
}
