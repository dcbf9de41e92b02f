//! Model reply handling: test cases plus automation steps

use crate::normalizer::normalize_plan;
use autoprobe_core_types::RawStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A model reply split into its test-case descriptions and normalized steps.
///
/// Replies are expected as `{"test_cases": [...], "automation_steps": [...]}`.
/// A reply that is a bare list is taken as the step list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub test_cases: Vec<Value>,
    pub steps: Vec<RawStep>,
}

impl PlanDocument {
    pub fn from_model_output(reply: Value) -> Self {
        let reply = match reply {
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!("Model reply is not valid JSON: {}", err);
                    return Self::default();
                }
            },
            other => other,
        };

        match reply {
            Value::Object(mut fields) => {
                let test_cases = match fields.remove("test_cases") {
                    Some(Value::Array(cases)) => cases,
                    Some(other) => {
                        warn!(value = %other, "Ignoring non-list test_cases");
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                let steps = fields
                    .remove("automation_steps")
                    .map(normalize_plan)
                    .unwrap_or_default();
                Self { test_cases, steps }
            }
            list @ Value::Array(_) => Self {
                test_cases: Vec::new(),
                steps: normalize_plan(list),
            },
            other => {
                warn!(value = %other, "Model reply has no plan");
                Self::default()
            }
        }
    }

    /// Parse a reply from raw text, e.g. a plan file.
    pub fn from_text(text: &str) -> Self {
        Self::from_model_output(Value::String(text.to_string()))
    }
}
