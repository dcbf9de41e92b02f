//! Sequential step execution with one-shot selector healing

use action_locator::{HealOutcome, HealRequest, SelectorHealer};
use action_primitives::{perform_interaction, with_deadline, InteractionTimeouts, PageDriver};
use autoprobe_core_types::{
    ExecutionLog, LogEntry, LogOutcome, RawStep, Step, StepAction, StepError,
};
use tracing::{debug, info, warn};

/// Runs normalized steps in order against one page.
///
/// A step failure never stops the run. Every step yields exactly one log
/// entry: `Executed`, `Failed`, `SelfHealed`, `FinalFailure` or `Skipped`.
pub struct ExecutionEngine {
    timeouts: InteractionTimeouts,
    healer: Option<SelectorHealer>,
}

impl ExecutionEngine {
    /// Engine without healing; failed interactions are logged as `Failed`.
    pub fn new(timeouts: InteractionTimeouts) -> Self {
        Self {
            timeouts,
            healer: None,
        }
    }

    pub fn with_healer(mut self, healer: SelectorHealer) -> Self {
        self.healer = Some(healer);
        self
    }

    pub fn timeouts(&self) -> &InteractionTimeouts {
        &self.timeouts
    }

    pub fn healing_enabled(&self) -> bool {
        self.healer.is_some()
    }

    /// Execute every step, strictly in sequence.
    pub async fn run(&self, driver: &dyn PageDriver, steps: Vec<RawStep>) -> ExecutionLog {
        info!(
            steps = steps.len(),
            healing = self.healing_enabled(),
            "Executing plan"
        );
        let mut log = ExecutionLog::new();

        for (index, raw) in steps.into_iter().enumerate() {
            debug!("Executing step {}", index);
            let entry = self.execute_step(driver, index, raw).await;
            if entry.outcome.is_success() {
                info!(index, outcome = %entry.outcome, "{}", entry);
            } else {
                warn!(index, outcome = %entry.outcome, "{}", entry);
            }
            log.push(entry);
        }

        info!(
            executed = log.count(LogOutcome::Executed),
            self_healed = log.count(LogOutcome::SelfHealed),
            failed = log.count(LogOutcome::Failed) + log.count(LogOutcome::FinalFailure),
            skipped = log.count(LogOutcome::Skipped),
            "Plan finished"
        );
        log
    }

    async fn execute_step(&self, driver: &dyn PageDriver, index: usize, raw: RawStep) -> LogEntry {
        let action_label = raw.action_label();
        let selector_label = raw.selector_label();

        let step = match raw.into_step() {
            Ok(step) => step,
            Err(StepError::UnknownAction(_)) => {
                return LogEntry::new(index, LogOutcome::Skipped, action_label, selector_label)
                    .with_detail("unknown action");
            }
            Err(err) => {
                return LogEntry::new(index, LogOutcome::Skipped, action_label, selector_label)
                    .with_detail(format!("invalid step: {}", err));
            }
        };

        if step.action.is_healable() {
            self.execute_interaction(driver, index, step).await
        } else if step.action.is_assertion() {
            self.execute_assertion(driver, index, step).await
        } else {
            LogEntry::new(index, LogOutcome::Skipped, step.action.as_str(), step.selector)
                .with_detail("unknown action")
        }
    }

    async fn execute_interaction(
        &self,
        driver: &dyn PageDriver,
        index: usize,
        step: Step,
    ) -> LogEntry {
        let action = step.action.as_str().to_string();
        let err = match perform_interaction(
            driver,
            &step.action,
            &step.selector,
            step.value.as_deref(),
            &self.timeouts,
        )
        .await
        {
            Ok(()) => return LogEntry::new(index, LogOutcome::Executed, action, step.selector),
            Err(err) => err,
        };

        debug!(
            index,
            element_failure = err.is_element_failure(),
            "Interaction failed: {}",
            err
        );

        let Some(healer) = &self.healer else {
            return LogEntry::new(index, LogOutcome::Failed, action, step.selector)
                .with_detail(err.to_string());
        };

        let request = HealRequest::new(
            step.action.clone(),
            step.selector.clone(),
            step.value.clone(),
            err.to_string(),
        );
        match healer.heal(driver, &request, &self.timeouts).await {
            HealOutcome::Healed { selector } => {
                LogEntry::new(index, LogOutcome::SelfHealed, action, selector)
                    .with_detail(format!("self-healed from '{}'", step.selector))
            }
            HealOutcome::Failed { reason, suggested } => {
                let detail = match suggested {
                    Some(tried) => format!("{}; {} (tried '{}')", err, reason, tried),
                    None => format!("{}; {}", err, reason),
                };
                LogEntry::new(index, LogOutcome::FinalFailure, action, step.selector)
                    .with_detail(detail)
            }
        }
    }

    async fn execute_assertion(
        &self,
        driver: &dyn PageDriver,
        index: usize,
        step: Step,
    ) -> LogEntry {
        let action = step.action.as_str().to_string();
        match self.check_assertion(driver, &step).await {
            Ok(()) => LogEntry::new(index, LogOutcome::Executed, action, step.selector),
            Err(detail) => LogEntry::new(index, LogOutcome::Failed, action, step.selector)
                .with_detail(format!("assertion failed: {}", detail)),
        }
    }

    /// Observational checks; they never mutate the page and never heal.
    async fn check_assertion(&self, driver: &dyn PageDriver, step: &Step) -> Result<(), String> {
        let timeout = self.timeouts.action();
        let selector = step.selector.as_str();

        match &step.action {
            StepAction::Assert | StepAction::AssertVisible => with_deadline(
                &format!("wait for {selector}"),
                timeout,
                driver.wait_for(selector, timeout),
            )
            .await
            .map_err(|err| err.to_string()),

            StepAction::AssertText => {
                let expected = step
                    .value
                    .as_deref()
                    .ok_or_else(|| "no expected text given".to_string())?;
                let text = with_deadline(
                    &format!("text of {selector}"),
                    timeout,
                    driver.inner_text(selector, timeout),
                )
                .await
                .map_err(|err| err.to_string())?;
                if text.contains(expected) {
                    Ok(())
                } else {
                    Err(format!("expected text '{}', found '{}'", expected, text))
                }
            }

            StepAction::AssertUrlContains => {
                let expected = step
                    .value
                    .as_deref()
                    .ok_or_else(|| "no expected URL fragment given".to_string())?;
                let url = with_deadline("current URL", timeout, driver.current_url())
                    .await
                    .map_err(|err| err.to_string())?;
                if url.contains(expected) {
                    Ok(())
                } else {
                    Err(format!("URL '{}' does not contain '{}'", url, expected))
                }
            }

            other => Err(format!("'{}' is not an assertion", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::testing::ScriptedSuggester;
    use action_primitives::testing::{DriverCall, ScriptedDriver};
    use action_primitives::ActionError;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn steps(plan: Value) -> Vec<RawStep> {
        crate::normalize_plan(plan)
    }

    fn healing_engine(reply: &str) -> (ExecutionEngine, Arc<ScriptedSuggester>) {
        let suggester = Arc::new(ScriptedSuggester::replying(reply));
        let engine = ExecutionEngine::new(InteractionTimeouts::default())
            .with_healer(SelectorHealer::new(suggester.clone()));
        (engine, suggester)
    }

    #[tokio::test]
    async fn executes_steps_in_order() {
        let driver = ScriptedDriver::new()
            .with_element("#user", "")
            .with_element("#go", "");
        let engine = ExecutionEngine::new(InteractionTimeouts::default());

        let log = engine
            .run(
                &driver,
                steps(json!([
                    {"action": "type", "selector": "#user", "value": "bob"},
                    {"action": "click", "selector": "#go"}
                ])),
            )
            .await;

        assert_eq!(
            log.lines(),
            vec!["Executed: type on #user", "Executed: click on #go"]
        );
        assert_eq!(
            driver.element_calls(),
            vec![
                DriverCall::Fill {
                    selector: "#user".into(),
                    value: "bob".into()
                },
                DriverCall::Click {
                    selector: "#go".into()
                }
            ]
        );
    }

    #[tokio::test]
    async fn unknown_action_is_skipped_without_driver() {
        let driver = ScriptedDriver::new().with_element("body", "");
        let engine = ExecutionEngine::new(InteractionTimeouts::default());

        let log = engine
            .run(&driver, steps(json!([{"action": "scroll", "selector": "body"}])))
            .await;

        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].outcome, LogOutcome::Skipped);
        assert_eq!(log.entries()[0].detail.as_deref(), Some("unknown action"));
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_action_wins_over_missing_selector() {
        let driver = ScriptedDriver::new();
        let engine = ExecutionEngine::new(InteractionTimeouts::default());

        let log = engine
            .run(
                &driver,
                steps(json!([
                    {"action": "scroll"},
                    {"action": "scroll", "selector": "body"}
                ])),
            )
            .await;

        assert_eq!(
            log.lines(),
            vec![
                "Skipped: scroll on  - unknown action",
                "Skipped: scroll on body - unknown action"
            ]
        );
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_step_is_skipped() {
        let driver = ScriptedDriver::new();
        let engine = ExecutionEngine::new(InteractionTimeouts::default());

        let log = engine
            .run(&driver, steps(json!([{"steps": [{"action": "click"}]}])))
            .await;

        assert_eq!(log.entries()[0].outcome, LogOutcome::Skipped);
        assert_eq!(
            log.entries()[0].detail.as_deref(),
            Some("invalid step: missing selector")
        );
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn failure_without_healer_continues() {
        let driver = ScriptedDriver::new().with_element("#go", "");
        let engine = ExecutionEngine::new(InteractionTimeouts::default());

        let log = engine
            .run(
                &driver,
                steps(json!([
                    {"action": "type", "selector": "#missing", "value": "x"},
                    {"action": "click", "selector": "#go"}
                ])),
            )
            .await;

        assert_eq!(log.entries()[0].outcome, LogOutcome::Failed);
        assert_eq!(log.entries()[1].outcome, LogOutcome::Executed);
    }

    #[tokio::test]
    async fn heals_timed_out_fill() {
        let driver = ScriptedDriver::new()
            .with_failure("#user", ActionError::Timeout("fill #user exceeded 3000ms".into()))
            .with_element("input[name=user]", "");
        let (engine, suggester) = healing_engine("{\"selector\":\"input[name=user]\"}");

        let log = engine
            .run(
                &driver,
                steps(json!([{"action": "type", "selector": "#user", "value": "bob"}])),
            )
            .await;

        let last = log.last().expect("entry");
        assert_eq!(last.outcome, LogOutcome::SelfHealed);
        assert_eq!(last.selector, "input[name=user]");
        assert!(last.to_string().starts_with("Self-healed: type on input[name=user]"));
        assert_eq!(suggester.requests().len(), 1);
        assert_eq!(driver.filled_value("input[name=user]").as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn never_matching_selector_heals_once() {
        let driver = ScriptedDriver::new();
        let (engine, suggester) = healing_engine("{\"selector\":\"#also-missing\"}");

        let log = engine
            .run(&driver, steps(json!([{"action": "click", "selector": "#nope"}])))
            .await;

        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].outcome, LogOutcome::FinalFailure);
        assert_eq!(log.entries()[0].selector, "#nope");
        assert!(log.entries()[0]
            .detail
            .as_deref()
            .unwrap_or_default()
            .ends_with("(tried '#also-missing')"));
        assert_eq!(suggester.requests().len(), 1);
        // first attempt + exactly one retry
        assert_eq!(driver.element_calls().len(), 2);
    }

    #[tokio::test]
    async fn unusable_suggestion_is_final_failure() {
        let driver = ScriptedDriver::new().with_element("#go", "");
        let (engine, _) = healing_engine("I am not sure which element you mean.");

        let log = engine
            .run(
                &driver,
                steps(json!([
                    {"action": "click", "selector": "#gone"},
                    {"action": "click", "selector": "#go"}
                ])),
            )
            .await;

        assert_eq!(log.entries()[0].outcome, LogOutcome::FinalFailure);
        assert!(log.entries()[0]
            .detail
            .as_deref()
            .unwrap_or_default()
            .contains("no JSON object"));
        assert_eq!(log.entries()[1].outcome, LogOutcome::Executed);
    }

    #[tokio::test]
    async fn failing_assert_text_never_heals() {
        let driver = ScriptedDriver::new().with_element(".msg", "Invalid password");
        let (engine, suggester) = healing_engine("{\"selector\":\".other\"}");

        let log = engine
            .run(
                &driver,
                steps(json!([
                    {"action": "assert_text", "selector": ".msg", "value": "Welcome"},
                    {"action": "assert_text", "selector": ".missing", "value": "Welcome"}
                ])),
            )
            .await;

        assert_eq!(log.count(LogOutcome::Failed), 2);
        assert!(suggester.requests().is_empty());
        assert!(!driver.calls().contains(&DriverCall::CurrentDom));
    }

    #[tokio::test]
    async fn assertions_pass() {
        let driver = ScriptedDriver::new()
            .with_element(".msg", "Welcome back, bob")
            .with_element("#dashboard", "")
            .with_element("#login", "")
            .with_click_navigation("#login", "https://app.test/dashboard");
        let engine = ExecutionEngine::new(InteractionTimeouts::default());

        let log = engine
            .run(
                &driver,
                steps(json!([
                    {"action": "click", "selector": "#login"},
                    {"action": "assert_url_contains", "selector": "body", "value": "/dashboard"},
                    {"action": "assert_text", "selector": ".msg", "value": "Welcome"},
                    {"action": "assert_visible", "selector": "#dashboard"},
                    {"action": "assert", "selector": "#dashboard"}
                ])),
            )
            .await;

        assert_eq!(log.count(LogOutcome::Executed), 5);
    }

    #[tokio::test]
    async fn hidden_element_fails_visibility_assertion() {
        let driver = ScriptedDriver::new().with_hidden_element("#modal");
        let (engine, suggester) = healing_engine("{\"selector\":\"#x\"}");

        let log = engine
            .run(
                &driver,
                steps(json!([{"action": "assert_visible", "selector": "#modal"}])),
            )
            .await;

        assert_eq!(log.entries()[0].outcome, LogOutcome::Failed);
        assert!(suggester.requests().is_empty());
    }

    #[tokio::test]
    async fn url_assertion_without_value_fails() {
        let driver = ScriptedDriver::new().with_url("https://app.test/");
        let engine = ExecutionEngine::new(InteractionTimeouts::default());

        let log = engine
            .run(
                &driver,
                steps(json!([{"action": "assert_url_contains", "selector": "body"}])),
            )
            .await;

        assert_eq!(log.entries()[0].outcome, LogOutcome::Failed);
        assert_eq!(
            log.entries()[0].detail.as_deref(),
            Some("assertion failed: no expected URL fragment given")
        );
    }
}
