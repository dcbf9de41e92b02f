//! Error types for page interactions

use thiserror::Error;

/// Failures reported by a page automation driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No element matched the selector before the deadline
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The interaction did not complete within its timeout
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The driver rejected or failed the command
    #[error("Driver error: {0}")]
    Driver(String),

    /// Navigation or load-state wait failed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    /// Failures the engine treats uniformly as an element interaction failure.
    ///
    /// Every variant qualifies except `Navigation` and `Internal`; those still
    /// fail the step but are not caused by the selector.
    pub fn is_element_failure(&self) -> bool {
        matches!(
            self,
            ActionError::ElementNotFound(_) | ActionError::Timeout(_) | ActionError::Driver(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_failures_are_classified() {
        assert!(ActionError::ElementNotFound("#a".into()).is_element_failure());
        assert!(ActionError::Timeout("3000ms".into()).is_element_failure());
        assert!(ActionError::Driver("detached".into()).is_element_failure());
        assert!(!ActionError::Navigation("dns".into()).is_element_failure());
    }
}
