//! State-changing interactions: `type` and `click`

use crate::{
    driver::{with_deadline, PageDriver},
    errors::ActionError,
    types::InteractionTimeouts,
};
use autoprobe_core_types::StepAction;
use tracing::debug;

/// Execute a `type` or `click` against `selector` under the action timeout.
///
/// `type` without a value fills the empty string. Any other action is an
/// internal error; callers route assertions elsewhere.
pub async fn perform_interaction(
    driver: &dyn PageDriver,
    action: &StepAction,
    selector: &str,
    value: Option<&str>,
    timeouts: &InteractionTimeouts,
) -> Result<(), ActionError> {
    let timeout = timeouts.action();
    match action {
        StepAction::Type => {
            let value = value.unwrap_or("");
            debug!(selector, chars = value.chars().count(), "fill");
            with_deadline(
                &format!("fill {selector}"),
                timeout,
                driver.fill(selector, value, timeout),
            )
            .await
        }
        StepAction::Click => {
            debug!(selector, "click");
            with_deadline(
                &format!("click {selector}"),
                timeout,
                driver.click(selector, timeout),
            )
            .await
        }
        other => Err(ActionError::Internal(format!(
            "'{}' is not an interaction",
            other
        ))),
    }
}
