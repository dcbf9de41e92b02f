use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Shape-varying plan input as produced by a model.
///
/// Models return the step list as a proper JSON array, as a JSON-encoded string
/// of that array, or as something else entirely. The normalizer matches on
/// this instead of probing runtime types at each call site.
#[derive(Clone, Debug, PartialEq)]
pub enum RawPlanValue {
    List(Vec<Value>),
    Encoded(String),
    Other(Value),
}

impl From<Value> for RawPlanValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => RawPlanValue::List(items),
            Value::String(text) => RawPlanValue::Encoded(text),
            other => RawPlanValue::Other(other),
        }
    }
}

impl From<Vec<Value>> for RawPlanValue {
    fn from(items: Vec<Value>) -> Self {
        RawPlanValue::List(items)
    }
}

impl From<String> for RawPlanValue {
    fn from(text: String) -> Self {
        RawPlanValue::Encoded(text)
    }
}

impl From<&str> for RawPlanValue {
    fn from(text: &str) -> Self {
        RawPlanValue::Encoded(text.to_string())
    }
}

/// Step action as named by the plan.
///
/// Unrecognised names are preserved in `Unknown` so the engine can log and
/// skip them rather than rejecting the plan.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StepAction {
    Type,
    Click,
    Assert,
    AssertUrlContains,
    AssertText,
    AssertVisible,
    Unknown(String),
}

impl StepAction {
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "type" => StepAction::Type,
            "click" => StepAction::Click,
            "assert" => StepAction::Assert,
            "assert_url_contains" => StepAction::AssertUrlContains,
            "assert_text" => StepAction::AssertText,
            "assert_visible" => StepAction::AssertVisible,
            other => StepAction::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StepAction::Type => "type",
            StepAction::Click => "click",
            StepAction::Assert => "assert",
            StepAction::AssertUrlContains => "assert_url_contains",
            StepAction::AssertText => "assert_text",
            StepAction::AssertVisible => "assert_visible",
            StepAction::Unknown(name) => name,
        }
    }

    /// Observational actions; a failure here is recorded but never healed.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            StepAction::Assert
                | StepAction::AssertUrlContains
                | StepAction::AssertText
                | StepAction::AssertVisible
        )
    }

    /// Actions whose selector failures are eligible for one healing attempt.
    pub fn is_healable(&self) -> bool {
        matches!(self, StepAction::Type | StepAction::Click)
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StepAction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepAction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(StepAction::parse(&name))
    }
}

/// A validated unit of browser interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub action: StepAction,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Reasons a step candidate cannot be turned into a [`Step`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("action must be a string")]
    InvalidAction,

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("missing selector")]
    MissingSelector,

    #[error("selector must be a non-empty string")]
    InvalidSelector,

    #[error("value must be a scalar")]
    InvalidValue,
}

/// A step candidate accepted verbatim by the normalizer.
///
/// Content is not validated until execution; [`RawStep::into_step`] performs
/// that check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStep(Map<String, Value>);

impl RawStep {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Action name for logging, even when the step is otherwise invalid.
    pub fn action_label(&self) -> String {
        match self.0.get("action") {
            Some(Value::String(name)) => name.trim().to_string(),
            Some(other) => other.to_string(),
            None => "<none>".to_string(),
        }
    }

    /// Selector text for logging, even when the step is otherwise invalid.
    pub fn selector_label(&self) -> String {
        match self.0.get("selector") {
            Some(Value::String(selector)) => selector.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Validate into a [`Step`].
    ///
    /// The action is classified before the selector is looked at, so an
    /// unrecognised action reports `UnknownAction` whatever else is missing.
    pub fn into_step(self) -> Result<Step, StepError> {
        let action = match self.0.get("action") {
            Some(Value::String(name)) => match StepAction::parse(name) {
                StepAction::Unknown(name) => return Err(StepError::UnknownAction(name)),
                known => known,
            },
            _ => return Err(StepError::InvalidAction),
        };

        let selector = match self.0.get("selector") {
            None | Some(Value::Null) => return Err(StepError::MissingSelector),
            Some(Value::String(selector)) if !selector.trim().is_empty() => selector.clone(),
            Some(_) => return Err(StepError::InvalidSelector),
        };

        let value = match self.0.get("value") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(Value::Bool(flag)) => Some(flag.to_string()),
            Some(_) => return Err(StepError::InvalidValue),
        };

        Ok(Step {
            action,
            selector,
            value,
        })
    }
}
