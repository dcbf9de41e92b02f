use action_locator::SuggestionRequest;
use serde_json::Value;

use super::PlanRequest;

const SELECTOR_SYSTEM_PROMPT: &str = "You are a strict JSON generator that repairs CSS \
selectors for browser automation. Reply with exactly one JSON object of the form \
{\"selector\": \"<css selector>\"}.";

const PLAN_SYSTEM_PROMPT: &str = "You are a strict JSON generator that drafts exploratory \
browser tests. Reply with exactly one JSON object holding \"test_cases\" and \
\"automation_steps\".";

/// Builds the chat messages for plan drafting and selector repair.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn selector_system_prompt(&self) -> &str {
        SELECTOR_SYSTEM_PROMPT
    }

    pub fn plan_system_prompt(&self) -> &str {
        PLAN_SYSTEM_PROMPT
    }

    pub fn build_selector_prompt(&self, request: &SuggestionRequest) -> String {
        format!(
            "The selector below failed during automated testing.\n\n\
             Action: {action}\n\
             Failed selector: {selector}\n\
             Error: {error}\n\n\
             Selector rules:\n\
             1. If the element has an id, use \"#id\".\n\
             2. Otherwise use input[name=\"...\"] or another attribute selector.\n\
             3. The selector must match exactly one element present in the DOM below.\n\
             4. Never invent elements that are not in the DOM.\n\n\
             Current DOM (truncated):\n{dom}\n\n\
             Return {{\"selector\": \"<corrected css selector>\"}}.",
            action = request.action,
            selector = request.selector,
            error = request.error_detail,
            dom = request.dom_snapshot,
        )
    }

    pub fn build_plan_prompt(&self, request: &PlanRequest) -> String {
        let test_data = Value::Object(request.test_data.clone());
        format!(
            "Draft exploratory tests for the page below.\n\n\
             Page URL: {url}\n\n\
             Test data (JSON object, may be empty):\n{test_data}\n\n\
             Scenario rules:\n\
             1. Use a test data entry only when its key matches an input's id, name, \
             placeholder or label text. Ignore keys that match nothing.\n\
             2. With no test data, write negative scenarios only (empty fields, invalid \
             input) and never assume a successful login.\n\
             3. If the page has inputs and a submit button, return at least one scenario.\n\
             4. Describe each test case as {{\"description\": \"...\"}}.\n\n\
             Step rules:\n\
             1. automation_steps is one flat list covering every test case, in order.\n\
             2. Each step is {{\"action\": ..., \"selector\": ..., \"value\": ...}} where action \
             is type, click, assert_url_contains, assert_text or assert_visible.\n\
             3. value is required for type, assert_text and assert_url_contains.\n\
             4. Steps are objects, never code, prose or strings.\n\n\
             Selector rules:\n\
             1. If the element has an id, use \"#id\".\n\
             2. Otherwise use input[name=\"...\"] or another attribute selector.\n\
             3. Each selector must match exactly one element in the DOM below.\n\
             4. Never invent elements that are not in the DOM.\n\n\
             Page DOM:\n{dom}\n\n\
             Return {{\"test_cases\": [...], \"automation_steps\": [...]}}.",
            url = request.url,
            test_data = test_data,
            dom = request.dom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selector_prompt_carries_failure_context() {
        let request = SuggestionRequest {
            action: "type".into(),
            selector: "#user".into(),
            error_detail: "Timeout: fill #user exceeded 3000ms".into(),
            dom_snapshot: "<input name=\"user\">".into(),
        };
        let prompt = PromptBuilder::new().build_selector_prompt(&request);
        assert!(prompt.contains("Action: type"));
        assert!(prompt.contains("Failed selector: #user"));
        assert!(prompt.contains("exceeded 3000ms"));
        assert!(prompt.contains("<input name=\"user\">"));
        assert!(prompt.ends_with("Return {\"selector\": \"<corrected css selector>\"}."));
    }

    #[test]
    fn plan_prompt_carries_page_and_test_data() {
        let test_data = match json!({"username": "bob"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let request = PlanRequest {
            url: "https://app.test/login".into(),
            dom: "<form><input id=\"username\"></form>".into(),
            test_data,
        };
        let prompt = PromptBuilder::new().build_plan_prompt(&request);
        assert!(prompt.contains("Page URL: https://app.test/login"));
        assert!(prompt.contains("{\"username\":\"bob\"}"));
        assert!(prompt.contains("<input id=\"username\">"));
        assert!(prompt.ends_with("Return {\"test_cases\": [...], \"automation_steps\": [...]}."));
    }

    #[test]
    fn plan_prompt_shows_empty_test_data() {
        let request = PlanRequest {
            url: "https://app.test/".into(),
            dom: "<body></body>".into(),
            test_data: Default::default(),
        };
        let prompt = PromptBuilder::new().build_plan_prompt(&request);
        assert!(prompt.contains("may be empty):\n{}\n"));
    }
}
