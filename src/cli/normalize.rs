use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::input::read_plan;

#[derive(Args, Clone, Debug)]
pub struct NormalizeArgs {
    /// Plan file (model reply JSON), or `-` for stdin
    #[arg(short, long, value_name = "FILE")]
    pub plan: PathBuf,
}

pub async fn cmd_normalize(args: NormalizeArgs) -> Result<()> {
    let plan = read_plan(&args.plan).await?;
    println!("{}", serde_json::to_string_pretty(&plan.steps)?);
    Ok(())
}
