use std::path::PathBuf;
use std::sync::Arc;

use action_flow::ExecutionEngine;
use action_locator::SelectorHealer;
use anyhow::{Context, Result};
use autoprobe_cli::config::Config;
use autoprobe_cli::llm::{OpenAiPlanGenerator, OpenAiSelectorSuggester};
use autoprobe_cli::runner::{run_session, PlanSource};
use cdp_adapter::ChromiumPageDriver;
use clap::Args;
use tokio::fs;
use tracing::{info, warn};

use super::input::{read_plan, read_test_data};
use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Page to open before executing the plan
    #[arg(short, long)]
    pub url: String,

    /// Plan file (model reply JSON), or `-` for stdin; drafted from the page when absent
    #[arg(short, long, value_name = "FILE")]
    pub plan: Option<PathBuf>,

    /// Known-good field values for plan drafting, as inline JSON or a file
    #[arg(long, value_name = "JSON|FILE", conflicts_with = "plan")]
    pub test_data: Option<String>,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Disable selector self-healing
    #[arg(long)]
    pub no_heal: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}

pub async fn cmd_run(args: RunArgs, ctx: &CliContext) -> Result<()> {
    let mut config = ctx.config().clone();
    if args.headed {
        config.browser.headless = false;
    }

    let generator;
    let source = match &args.plan {
        Some(path) => PlanSource::Provided(read_plan(path).await?),
        None => {
            let test_data = read_test_data(args.test_data.as_deref()).await?;
            generator = OpenAiPlanGenerator::new(config.openai_config()).context(
                "Plan drafting needs an OpenAI API key (OPENAI_API_KEY or llm.api_keys); \
                 or pass --plan",
            )?;
            info!(test_data_keys = test_data.len(), "Plan will be drafted from the page");
            PlanSource::Generate {
                generator: &generator,
                test_data,
            }
        }
    };
    let engine = build_engine(&config, !args.no_heal);

    let driver = ChromiumPageDriver::launch(config.cdp_config())
        .await
        .context("Failed to launch browser")?;
    let result = run_session(&driver, &engine, &args.url, source).await;
    if let Err(err) = driver.close().await {
        warn!("Browser shutdown failed: {}", err);
    }
    let report = result.context("Run aborted")?;

    for line in report.execution_log.lines() {
        info!("{}", line);
    }

    let rendered = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    if !report.passed() {
        warn!(run_id = %report.run_id, "Run finished with failed steps");
    }
    Ok(())
}

/// Engine with healing when enabled and an API key is available.
fn build_engine(config: &Config, heal: bool) -> ExecutionEngine {
    let engine = ExecutionEngine::new(config.timeouts);
    if !heal || !config.healer.enabled {
        info!("Self-healing disabled");
        return engine;
    }

    match OpenAiSelectorSuggester::new(config.openai_config()) {
        Ok(suggester) => engine.with_healer(
            SelectorHealer::new(Arc::new(suggester)).with_config(config.healer_config()),
        ),
        Err(err) => {
            warn!("Self-healing disabled: {}", err);
            engine
        }
    }
}
