//! Page automation driver trait

use crate::errors::ActionError;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Extra time granted on top of a driver timeout before the call is abandoned.
pub const DEADLINE_GRACE: Duration = Duration::from_millis(250);

/// Browser-control capability consumed by the execution engine.
///
/// One driver instance wraps one page. Calls are never issued concurrently
/// against the same driver.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the page to `url`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ActionError>;

    /// Wait until the page has no outstanding network activity
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), ActionError>;

    /// Serialized HTML of the live document
    async fn current_dom(&self) -> Result<String, ActionError>;

    async fn current_url(&self) -> Result<String, ActionError>;

    /// Replace the value of the input at `selector`
    async fn fill(&self, selector: &str, value: &str, timeout: Duration)
        -> Result<(), ActionError>;

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), ActionError>;

    /// Locate `selector` and wait for it to be visible
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), ActionError>;

    /// Rendered text of the element at `selector`
    async fn inner_text(&self, selector: &str, timeout: Duration) -> Result<String, ActionError>;

    /// Full-page PNG capture
    async fn screenshot(&self) -> Result<Vec<u8>, ActionError>;
}

/// Run a driver call under `timeout` plus [`DEADLINE_GRACE`].
///
/// Drivers are expected to honour the timeout they are given; this guard turns
/// a driver that hangs anyway into an ordinary `Timeout` failure.
pub async fn with_deadline<T, F>(
    operation: &str,
    timeout: Duration,
    future: F,
) -> Result<T, ActionError>
where
    F: Future<Output = Result<T, ActionError>>,
{
    match tokio::time::timeout(timeout + DEADLINE_GRACE, future).await {
        Ok(result) => result,
        Err(_) => {
            debug!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "driver call exceeded deadline"
            );
            Err(ActionError::Timeout(format!(
                "{} exceeded {}ms",
                operation,
                timeout.as_millis()
            )))
        }
    }
}
