use std::path::Path;

use action_flow::PlanDocument;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::info;

/// Read a plan document from a file, or from stdin when the path is `-`.
pub async fn read_plan(path: &Path) -> Result<PlanDocument> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read plan from stdin")?;
        text
    } else {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read plan file {}", path.display()))?
    };

    let plan = PlanDocument::from_text(&text);
    info!(
        steps = plan.steps.len(),
        test_cases = plan.test_cases.len(),
        "Loaded plan"
    );
    Ok(plan)
}

/// Test data given inline as a JSON object, or as the path of a file holding one.
///
/// Absent input is an empty object.
pub async fn read_test_data(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };

    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        fs::read_to_string(raw)
            .await
            .with_context(|| format!("Failed to read test data file {}", raw))?
    };

    match serde_json::from_str(&text).context("Test data is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("Test data must be a JSON object, got {}", other),
    }
}
