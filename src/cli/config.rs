use anyhow::Result;
use autoprobe_cli::config::default_config_paths;
use clap::{Args, Subcommand};

use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration
    Validate,

    /// List the files searched when --config is not given
    Paths,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            match ctx.config_path() {
                Some(path) => println!("Current configuration ({}):", path.display()),
                None => println!("Current configuration (defaults):"),
            }
            println!("{}", serde_yaml::to_string(ctx.config())?);
            println!("# llm api keys configured: {}", ctx.config().llm.api_keys.len());
        }
        ConfigAction::Validate => {
            // loading already validated it
            println!("Configuration is valid");
        }
        ConfigAction::Paths => {
            for path in default_config_paths() {
                let marker = if path.exists() { "found" } else { "missing" };
                println!("{} ({})", path.display(), marker);
            }
        }
    }
    Ok(())
}
