use std::sync::Arc;

use action_flow::{ExecutionEngine, PlanDocument};
use action_locator::testing::ScriptedSuggester;
use action_locator::SelectorHealer;
use action_primitives::testing::{DriverCall, ScriptedDriver};
use action_primitives::{ActionError, InteractionTimeouts};
use async_trait::async_trait;
use autoprobe_cli::llm::{LlmError, PlanGenerator, PlanRequest};
use autoprobe_cli::{run_session, PlanSource};
use autoprobe_core_types::LogOutcome;
use serde_json::{Map, Value};

const MODEL_REPLY: &str = r##"{
  "test_cases": [
    {"description": "login with the provided user"},
    {"description": "empty password shows an error"}
  ],
  "automation_steps": [
    {"action": "type", "selector": "#user", "value": "bob"},
    {"steps": [
      {"action": "type", "selector": "#password", "value": "hunter2"},
      {"action": "click", "selector": "#login"}
    ]},
    "#login.click()",
    {"action": "scroll", "selector": "body"},
    {"action": "assert_url_contains", "selector": "body", "value": "/dashboard"},
    {"action": "assert_text", "selector": ".greeting", "value": "Welcome"}
  ]
}"##;

const LOGIN_FORM: &str =
    r#"<form><input name="user"><input id="password"><button id="login">Go</button></form>"#;

fn login_page() -> ScriptedDriver {
    ScriptedDriver::new()
        .with_failure(
            "#user",
            ActionError::Timeout("waiting for selector '#user' exceeded 3000ms".into()),
        )
        .with_element("input[name=user]", "")
        .with_element("#password", "")
        .with_element("#login", "")
        .with_element(".greeting", "Welcome back, bob")
        .with_click_navigation("#login", "https://app.test/dashboard")
        .with_dom(LOGIN_FORM)
}

#[tokio::test]
async fn heals_renamed_field_and_finishes_plan() {
    let driver = login_page();
    let suggester = Arc::new(ScriptedSuggester::replying(
        "Use this one: {\"selector\": \"input[name=user]\"}",
    ));
    let engine = ExecutionEngine::new(InteractionTimeouts::default())
        .with_healer(SelectorHealer::new(suggester.clone()));

    let report = run_session(
        &driver,
        &engine,
        "https://app.test/login",
        PlanSource::Provided(PlanDocument::from_text(MODEL_REPLY)),
    )
    .await
    .expect("run completes");

    assert_eq!(report.test_cases.len(), 2);
    let outcomes: Vec<LogOutcome> = report
        .execution_log
        .entries()
        .iter()
        .map(|entry| entry.outcome)
        .collect();
    assert_eq!(
        outcomes,
        vec![
            LogOutcome::SelfHealed,
            LogOutcome::Executed,
            LogOutcome::Executed,
            LogOutcome::Skipped,
            LogOutcome::Executed,
            LogOutcome::Executed,
        ]
    );

    let healed = &report.execution_log.entries()[0];
    assert_eq!(healed.selector, "input[name=user]");
    assert_eq!(driver.filled_value("input[name=user]").as_deref(), Some("bob"));

    let requests = suggester.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].selector, "#user");
    assert!(requests[0].dom_snapshot.contains("input name=\"user\""));
    assert!(report.passed());
    assert!(!report.screenshot.is_empty());
}

#[tokio::test]
async fn without_healer_failures_are_logged_and_run_continues() {
    let driver = login_page();
    let engine = ExecutionEngine::new(InteractionTimeouts::default());

    let report = run_session(
        &driver,
        &engine,
        "https://app.test/login",
        PlanSource::Provided(PlanDocument::from_text(MODEL_REPLY)),
    )
    .await
    .expect("run completes");

    let first = &report.execution_log.entries()[0];
    assert_eq!(first.outcome, LogOutcome::Failed);
    assert_eq!(first.selector, "#user");
    assert_eq!(report.execution_log.len(), 6);
    assert!(!report.passed());
    assert!(!driver.calls().contains(&DriverCall::CurrentDom));
}

#[tokio::test]
async fn one_entry_per_step_even_when_everything_fails() {
    let driver = ScriptedDriver::new();
    let suggester = Arc::new(ScriptedSuggester::replying("{\"selector\": \"#nothing\"}"));
    let engine = ExecutionEngine::new(InteractionTimeouts::default())
        .with_healer(SelectorHealer::new(suggester.clone()));

    let report = run_session(
        &driver,
        &engine,
        "https://app.test/",
        PlanSource::Provided(PlanDocument::from_text(MODEL_REPLY)),
    )
    .await
    .expect("run completes");

    assert_eq!(report.execution_log.len(), 6);
    assert_eq!(report.execution_log.count(LogOutcome::FinalFailure), 3);
    // the three failed interactions each asked exactly once
    assert_eq!(suggester.requests().len(), 3);
}

#[test]
fn garbage_reply_runs_nothing() {
    let driver = ScriptedDriver::new();
    let engine = ExecutionEngine::new(InteractionTimeouts::default());

    let report = tokio_test::block_on(run_session(
        &driver,
        &engine,
        "https://app.test/",
        PlanSource::Provided(PlanDocument::from_text("Sorry, I cannot help with that.")),
    ))
    .expect("run completes");

    assert!(report.execution_log.is_empty());
    assert!(report.test_cases.is_empty());
    assert!(driver.element_calls().is_empty());
}

/// Drafts the login plan regardless of the page and remembers what it saw.
struct LoginPlanner {
    seen: std::sync::Mutex<Vec<PlanRequest>>,
}

#[async_trait]
impl PlanGenerator for LoginPlanner {
    async fn generate(&self, request: &PlanRequest) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(MODEL_REPLY.to_string())
    }
}

#[tokio::test]
async fn drafted_plan_is_healed_like_a_provided_one() {
    let driver = login_page();
    let suggester = Arc::new(ScriptedSuggester::replying("{\"selector\": \"input[name=user]\"}"));
    let engine = ExecutionEngine::new(InteractionTimeouts::default())
        .with_healer(SelectorHealer::new(suggester));
    let planner = LoginPlanner {
        seen: std::sync::Mutex::new(Vec::new()),
    };
    let mut test_data = Map::new();
    test_data.insert("user".into(), Value::from("bob"));

    let report = run_session(
        &driver,
        &engine,
        "https://app.test/login",
        PlanSource::Generate {
            generator: &planner,
            test_data,
        },
    )
    .await
    .expect("run completes");

    assert_eq!(report.test_cases.len(), 2);
    assert_eq!(report.execution_log.len(), 6);
    assert_eq!(report.execution_log.entries()[0].outcome, LogOutcome::SelfHealed);
    assert!(report.passed());

    let seen = planner.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].dom, LOGIN_FORM);
    assert_eq!(seen[0].test_data["user"], "bob");
}
