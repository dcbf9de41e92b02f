//! Scripted in-memory driver for tests
//!
//! Elements are registered up front by selector; any other selector misses.
//! Every call is recorded so tests can assert exactly what was sent.

use crate::{driver::PageDriver, errors::ActionError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Navigate { url: String },
    WaitForNetworkIdle,
    CurrentDom,
    CurrentUrl,
    Fill { selector: String, value: String },
    Click { selector: String },
    WaitFor { selector: String },
    InnerText { selector: String },
    Screenshot,
}

impl DriverCall {
    /// Selector targeted by the call, for element operations.
    pub fn selector(&self) -> Option<&str> {
        match self {
            DriverCall::Fill { selector, .. }
            | DriverCall::Click { selector }
            | DriverCall::WaitFor { selector }
            | DriverCall::InnerText { selector } => Some(selector),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ScriptedElement {
    text: String,
    visible: bool,
}

#[derive(Default)]
pub struct ScriptedDriver {
    elements: HashMap<String, ScriptedElement>,
    failures: HashMap<String, ActionError>,
    click_targets: HashMap<String, String>,
    navigation_error: Option<ActionError>,
    dom: Option<String>,
    screenshot: Option<Vec<u8>>,
    url: Mutex<String>,
    filled: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<DriverCall>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self {
            dom: Some("<html><body></body></html>".to_string()),
            screenshot: Some(b"\x89PNG".to_vec()),
            url: Mutex::new("about:blank".to_string()),
            ..Default::default()
        }
    }

    /// Register a visible element with the given text.
    pub fn with_element(mut self, selector: &str, text: &str) -> Self {
        self.elements.insert(
            selector.to_string(),
            ScriptedElement {
                text: text.to_string(),
                visible: true,
            },
        );
        self
    }

    /// Register an element that exists but never becomes visible.
    pub fn with_hidden_element(mut self, selector: &str) -> Self {
        self.elements.insert(
            selector.to_string(),
            ScriptedElement {
                text: String::new(),
                visible: false,
            },
        );
        self
    }

    /// Make every call against `selector` fail with `error`.
    pub fn with_failure(mut self, selector: &str, error: ActionError) -> Self {
        self.failures.insert(selector.to_string(), error);
        self
    }

    /// Clicking `selector` moves the page to `url`.
    pub fn with_click_navigation(mut self, selector: &str, url: &str) -> Self {
        self.click_targets
            .insert(selector.to_string(), url.to_string());
        self
    }

    /// Every navigation fails with `error`.
    pub fn with_navigation_failure(mut self, error: ActionError) -> Self {
        self.navigation_error = Some(error);
        self
    }

    pub fn with_dom(mut self, dom: &str) -> Self {
        self.dom = Some(dom.to_string());
        self
    }

    /// DOM retrieval fails.
    pub fn without_dom(mut self) -> Self {
        self.dom = None;
        self
    }

    /// Screenshot capture fails.
    pub fn without_screenshot(mut self) -> Self {
        self.screenshot = None;
        self
    }

    pub fn with_url(self, url: &str) -> Self {
        *self.url.lock().expect("url lock") = url.to_string();
        self
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().expect("call log lock").clone()
    }

    /// Calls that targeted an element.
    pub fn element_calls(&self) -> Vec<DriverCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.selector().is_some())
            .collect()
    }

    pub fn filled_value(&self, selector: &str) -> Option<String> {
        self.filled.lock().expect("fill lock").get(selector).cloned()
    }

    fn record(&self, call: DriverCall) {
        self.calls.lock().expect("call log lock").push(call);
    }

    fn element(&self, selector: &str, timeout: Duration) -> Result<&ScriptedElement, ActionError> {
        if let Some(error) = self.failures.get(selector) {
            return Err(error.clone());
        }
        self.elements.get(selector).ok_or_else(|| {
            ActionError::Timeout(format!(
                "waiting for selector '{}' exceeded {}ms",
                selector,
                timeout.as_millis()
            ))
        })
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), ActionError> {
        self.record(DriverCall::Navigate {
            url: url.to_string(),
        });
        if let Some(error) = &self.navigation_error {
            return Err(error.clone());
        }
        *self.url.lock().expect("url lock") = url.to_string();
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> Result<(), ActionError> {
        self.record(DriverCall::WaitForNetworkIdle);
        Ok(())
    }

    async fn current_dom(&self) -> Result<String, ActionError> {
        self.record(DriverCall::CurrentDom);
        self.dom
            .clone()
            .ok_or_else(|| ActionError::Driver("page content unavailable".to_string()))
    }

    async fn current_url(&self) -> Result<String, ActionError> {
        self.record(DriverCall::CurrentUrl);
        Ok(self.url.lock().expect("url lock").clone())
    }

    async fn fill(
        &self,
        selector: &str,
        value: &str,
        timeout: Duration,
    ) -> Result<(), ActionError> {
        self.record(DriverCall::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        });
        self.element(selector, timeout)?;
        self.filled
            .lock()
            .expect("fill lock")
            .insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), ActionError> {
        self.record(DriverCall::Click {
            selector: selector.to_string(),
        });
        self.element(selector, timeout)?;
        if let Some(url) = self.click_targets.get(selector) {
            *self.url.lock().expect("url lock") = url.clone();
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), ActionError> {
        self.record(DriverCall::WaitFor {
            selector: selector.to_string(),
        });
        let element = self.element(selector, timeout)?;
        if element.visible {
            Ok(())
        } else {
            Err(ActionError::Timeout(format!(
                "selector '{}' not visible within {}ms",
                selector,
                timeout.as_millis()
            )))
        }
    }

    async fn inner_text(&self, selector: &str, timeout: Duration) -> Result<String, ActionError> {
        self.record(DriverCall::InnerText {
            selector: selector.to_string(),
        });
        Ok(self.element(selector, timeout)?.text.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, ActionError> {
        self.record(DriverCall::Screenshot);
        self.screenshot
            .clone()
            .ok_or_else(|| ActionError::Driver("screenshot failed".to_string()))
    }
}
