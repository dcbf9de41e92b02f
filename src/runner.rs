//! One exploratory run: open the page, execute the plan, capture the result

use crate::llm::{LlmError, PlanGenerator, PlanRequest};
use action_flow::{ExecutionEngine, PlanDocument};
use action_primitives::{with_deadline, ActionError, PageDriver};
use autoprobe_core_types::{ExecutionLog, LogOutcome, RunId};
use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: ActionError,
    },

    #[error("capturing the page for planning failed: {0}")]
    Snapshot(#[source] ActionError),

    #[error("plan generation failed: {0}")]
    Planning(#[from] LlmError),
}

/// Where the steps for a run come from.
pub enum PlanSource<'a> {
    /// A model reply obtained ahead of the run
    Provided(PlanDocument),
    /// Draft the plan from the loaded page once it has settled
    Generate {
        generator: &'a dyn PlanGenerator,
        test_data: Map<String, Value>,
    },
}

/// Result of a run, serialisable as the response document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub url: String,
    pub test_cases: Vec<Value>,
    pub execution_log: ExecutionLog,
    /// Base64 PNG of the full page; empty when capture failed
    pub screenshot: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// No step ended in `Failed` or `Final failure`.
    pub fn passed(&self) -> bool {
        self.execution_log.count(LogOutcome::Failed) == 0
            && self.execution_log.count(LogOutcome::FinalFailure) == 0
    }
}

/// Navigate to `url`, execute the plan's steps and take a final screenshot.
///
/// Navigation failure aborts the run, as does a failed DOM capture or model
/// call when the plan is generated. A page that never goes network-idle and a
/// failed screenshot are logged and tolerated.
pub async fn run_session(
    driver: &dyn PageDriver,
    engine: &ExecutionEngine,
    url: &str,
    source: PlanSource<'_>,
) -> Result<RunReport, RunError> {
    let run_id = RunId::new();
    let started_at = Utc::now();
    let timeouts = *engine.timeouts();
    info!(run_id = %run_id, url, "Starting run");

    with_deadline(
        "navigate",
        timeouts.navigation(),
        driver.navigate(url, timeouts.navigation()),
    )
    .await
    .map_err(|source| RunError::Navigation {
        url: url.to_string(),
        source,
    })?;

    if let Err(err) = with_deadline(
        "network idle",
        timeouts.network_idle(),
        driver.wait_for_network_idle(timeouts.network_idle()),
    )
    .await
    {
        warn!(run_id = %run_id, "Page did not settle, continuing: {}", err);
    }

    let plan = match source {
        PlanSource::Provided(plan) => plan,
        PlanSource::Generate {
            generator,
            test_data,
        } => {
            let dom = with_deadline("capture DOM", timeouts.navigation(), driver.current_dom())
                .await
                .map_err(RunError::Snapshot)?;
            let request = PlanRequest {
                url: url.to_string(),
                dom,
                test_data,
            };
            let reply = generator.generate(&request).await?;
            PlanDocument::from_text(&reply)
        }
    };
    info!(
        run_id = %run_id,
        steps = plan.steps.len(),
        test_cases = plan.test_cases.len(),
        "Plan ready"
    );

    let PlanDocument { test_cases, steps } = plan;
    let execution_log = engine.run(driver, steps).await;

    let screenshot = match with_deadline("screenshot", timeouts.navigation(), driver.screenshot())
        .await
    {
        Ok(bytes) => Base64.encode(bytes),
        Err(err) => {
            warn!(run_id = %run_id, "Screenshot capture failed: {}", err);
            String::new()
        }
    };

    info!(run_id = %run_id, entries = execution_log.len(), "Run complete");
    Ok(RunReport {
        run_id,
        url: url.to_string(),
        test_cases,
        execution_log,
        screenshot,
        started_at,
        finished_at: Utc::now(),
    })
}
