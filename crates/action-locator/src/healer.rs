//! Self-healing mechanism with a one-attempt limit per failed step

use crate::{
    errors::{HealError, SuggestError},
    extract::{extract_json_object, truncate_snapshot},
    types::*,
};
use action_primitives::{perform_interaction, with_deadline, InteractionTimeouts, PageDriver};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Selector suggestion service.
///
/// The returned text should contain `{"selector": "..."}` but may carry
/// surrounding prose; the healer does the parsing.
#[async_trait]
pub trait SelectorSuggester: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<String, SuggestError>;
}

/// Asks the suggestion service for a corrected selector and retries once.
///
/// The healer holds no per-step state; the engine calls it at most once for
/// each failed step, so there is no chained retry.
#[derive(Clone)]
pub struct SelectorHealer {
    suggester: Arc<dyn SelectorSuggester>,
    config: HealerConfig,
}

impl SelectorHealer {
    pub fn new(suggester: Arc<dyn SelectorSuggester>) -> Self {
        Self {
            suggester,
            config: HealerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: HealerConfig) -> Self {
        self.config = config;
        self
    }

    /// Attempt to recover a failed `type`/`click`.
    pub async fn heal(
        &self,
        driver: &dyn PageDriver,
        request: &HealRequest,
        timeouts: &InteractionTimeouts,
    ) -> HealOutcome {
        info!(
            action = %request.action,
            selector = %request.selector,
            "Attempting self-heal"
        );

        let dom = match with_deadline("capture DOM", timeouts.action(), driver.current_dom()).await
        {
            Ok(dom) => dom,
            Err(err) => {
                warn!("DOM snapshot failed: {}", err);
                return HealError::Snapshot(err.to_string()).into();
            }
        };

        let suggestion_request = SuggestionRequest {
            action: request.action.to_string(),
            selector: request.selector.clone(),
            error_detail: request.error_detail.clone(),
            dom_snapshot: truncate_snapshot(&dom, self.config.dom_snapshot_chars).to_string(),
        };

        let response = match self.suggester.suggest(&suggestion_request).await {
            Ok(response) => response,
            Err(err) => {
                warn!("Selector suggestion failed: {}", err);
                return HealError::from(err).into();
            }
        };

        let selector = match parse_suggested_selector(&response) {
            Ok(selector) => selector,
            Err(err) => {
                warn!(response = %preview(&response), "Unusable suggestion: {}", err);
                return err.into();
            }
        };

        if selector == request.selector {
            debug!("Suggested selector matches the failing one; retrying once anyway");
        }

        match perform_interaction(
            driver,
            &request.action,
            &selector,
            request.value.as_deref(),
            timeouts,
        )
        .await
        {
            Ok(()) => {
                info!(selector = %selector, "Heal successful");
                HealOutcome::Healed { selector }
            }
            Err(err) => {
                warn!(selector = %selector, "Retry with suggested selector failed: {}", err);
                HealOutcome::Failed {
                    reason: HealError::RetryFailed(err.to_string()),
                    suggested: Some(selector),
                }
            }
        }
    }
}

/// Pull the `selector` field out of a free-text suggestion response.
pub fn parse_suggested_selector(raw: &str) -> Result<String, HealError> {
    let object = extract_json_object(raw).ok_or(HealError::NoJson)?;
    match object.get("selector") {
        Some(Value::String(selector)) if !selector.trim().is_empty() => {
            Ok(selector.trim().to_string())
        }
        _ => Err(HealError::MissingSelector),
    }
}

fn preview(text: &str) -> &str {
    truncate_snapshot(text, 200)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSuggester;
    use action_primitives::testing::{DriverCall, ScriptedDriver};
    use action_primitives::ActionError;
    use autoprobe_core_types::StepAction;

    fn type_request() -> HealRequest {
        HealRequest::new(
            StepAction::Type,
            "#user",
            Some("bob".to_string()),
            "Timeout: fill #user exceeded 3000ms",
        )
    }

    #[test]
    fn parses_selector_from_prose() {
        let selector =
            parse_suggested_selector("Try this: {\"selector\": \" input[name=user] \"}").unwrap();
        assert_eq!(selector, "input[name=user]");
    }

    #[test]
    fn rejects_missing_or_empty_selector() {
        assert_eq!(
            parse_suggested_selector("{\"css\": \"#a\"}"),
            Err(HealError::MissingSelector)
        );
        assert_eq!(
            parse_suggested_selector("{\"selector\": \"\"}"),
            Err(HealError::MissingSelector)
        );
        assert_eq!(
            parse_suggested_selector("{\"selector\": 3}"),
            Err(HealError::MissingSelector)
        );
        assert_eq!(parse_suggested_selector("no idea"), Err(HealError::NoJson));
    }

    #[tokio::test]
    async fn heals_with_suggested_selector() {
        let driver = ScriptedDriver::new().with_element("input[name=user]", "");
        let suggester = Arc::new(ScriptedSuggester::replying(
            "{\"selector\": \"input[name=user]\"}",
        ));
        let healer = SelectorHealer::new(suggester.clone());

        let outcome = healer
            .heal(&driver, &type_request(), &InteractionTimeouts::default())
            .await;

        assert_eq!(
            outcome,
            HealOutcome::Healed {
                selector: "input[name=user]".into()
            }
        );
        assert_eq!(driver.filled_value("input[name=user]").as_deref(), Some("bob"));
        assert_eq!(suggester.requests().len(), 1);
        assert_eq!(suggester.requests()[0].selector, "#user");
    }

    #[tokio::test]
    async fn snapshot_is_truncated() {
        let dom = "x".repeat(10_000);
        let driver = ScriptedDriver::new().with_dom(&dom);
        let suggester = Arc::new(ScriptedSuggester::replying("{}"));
        let healer = SelectorHealer::new(suggester.clone()).with_config(HealerConfig {
            dom_snapshot_chars: 4000,
        });

        healer
            .heal(&driver, &type_request(), &InteractionTimeouts::default())
            .await;

        assert_eq!(suggester.requests()[0].dom_snapshot.len(), 4000);
    }

    #[tokio::test]
    async fn retry_failure_is_terminal_after_one_attempt() {
        let driver = ScriptedDriver::new();
        let suggester = Arc::new(ScriptedSuggester::replying("{\"selector\": \"#still-missing\"}"));
        let healer = SelectorHealer::new(suggester);

        let outcome = healer
            .heal(&driver, &type_request(), &InteractionTimeouts::default())
            .await;

        match outcome {
            HealOutcome::Failed {
                reason: HealError::RetryFailed(_),
                suggested,
            } => assert_eq!(suggested.as_deref(), Some("#still-missing")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(driver.element_calls().len(), 1);
    }

    #[tokio::test]
    async fn service_error_skips_retry() {
        let driver = ScriptedDriver::new().with_element("#user", "");
        let suggester = Arc::new(ScriptedSuggester::failing(SuggestError::Unavailable(
            "connection refused".into(),
        )));
        let healer = SelectorHealer::new(suggester);

        let outcome = healer
            .heal(&driver, &type_request(), &InteractionTimeouts::default())
            .await;

        assert!(matches!(
            outcome,
            HealOutcome::Failed {
                reason: HealError::Service(_),
                suggested: None
            }
        ));
        assert!(driver.element_calls().is_empty());
    }

    #[tokio::test]
    async fn snapshot_failure_skips_service() {
        let driver = ScriptedDriver::new().without_dom();
        let suggester = Arc::new(ScriptedSuggester::replying("{\"selector\": \"#x\"}"));
        let healer = SelectorHealer::new(suggester.clone());

        let outcome = healer
            .heal(&driver, &type_request(), &InteractionTimeouts::default())
            .await;

        assert!(matches!(
            outcome,
            HealOutcome::Failed {
                reason: HealError::Snapshot(_),
                ..
            }
        ));
        assert!(suggester.requests().is_empty());
        assert_eq!(driver.calls(), vec![DriverCall::CurrentDom]);
    }

    #[tokio::test]
    async fn click_heal_uses_click() {
        let driver = ScriptedDriver::new()
            .with_element("button[type=submit]", "")
            .with_failure("#go", ActionError::ElementNotFound("#go".into()));
        let suggester = Arc::new(ScriptedSuggester::replying(
            "```json\n{\"selector\": \"button[type=submit]\"}\n```",
        ));
        let healer = SelectorHealer::new(suggester);
        let request = HealRequest::new(StepAction::Click, "#go", None, "Element not found: #go");

        let outcome = healer
            .heal(&driver, &request, &InteractionTimeouts::default())
            .await;

        assert!(matches!(outcome, HealOutcome::Healed { .. }));
        assert_eq!(
            driver.element_calls(),
            vec![DriverCall::Click {
                selector: "button[type=submit]".into()
            }]
        );
    }
}
