//! Step normalization for model-authored plans
//!
//! Pure and synchronous: no browser, no network, no error path. Anything that
//! cannot be interpreted is dropped (and logged) instead of failing the run.

use autoprobe_core_types::{RawPlanValue, RawStep};
use serde_json::Value;
use tracing::{debug, warn};

/// Flatten raw plan input into ordered step candidates.
///
/// - A string is decoded as JSON once; undecodable text yields no steps.
/// - Anything other than a list yields no steps.
/// - A mapping with `action` is accepted verbatim.
/// - A mapping with `steps` contributes the mappings of that nested list. Only
///   one level is unwrapped.
/// - Everything else is skipped.
pub fn normalize_plan(raw: impl Into<RawPlanValue>) -> Vec<RawStep> {
    let items = match raw.into() {
        RawPlanValue::List(items) => items,
        RawPlanValue::Encoded(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                warn!(kind = json_kind(&other), "Encoded plan is not a list");
                return Vec::new();
            }
            Err(err) => {
                warn!("Plan string is not valid JSON: {}", err);
                return Vec::new();
            }
        },
        RawPlanValue::Other(other) => {
            warn!(kind = json_kind(&other), "Plan is not a list");
            return Vec::new();
        }
    };

    let mut steps = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) if map.contains_key("action") => steps.push(RawStep::new(map)),
            Value::Object(mut map) if map.contains_key("steps") => {
                let nested = map.remove("steps").unwrap_or(Value::Null);
                unwrap_nested(position, nested, &mut steps);
            }
            other => {
                warn!(
                    position,
                    kind = json_kind(&other),
                    "Skipping invalid step format"
                );
            }
        }
    }

    debug!(count = steps.len(), "Normalized plan");
    steps
}

fn unwrap_nested(position: usize, nested: Value, steps: &mut Vec<RawStep>) {
    let Value::Array(items) = nested else {
        warn!(
            position,
            kind = json_kind(&nested),
            "Skipping invalid step format"
        );
        return;
    };

    debug!(position, count = items.len(), "Unwrapping nested steps");
    for item in items {
        match item {
            Value::Object(map) => steps.push(RawStep::new(map)),
            other => {
                warn!(
                    position,
                    kind = json_kind(&other),
                    "Skipping invalid step format"
                );
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
