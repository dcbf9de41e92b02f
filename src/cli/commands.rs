use clap::Subcommand;

use super::config::ConfigArgs;
use super::normalize::NormalizeArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Execute a plan against a live page with self-healing
    Run(RunArgs),

    /// Print the normalized steps of a plan without opening a browser
    Normalize(NormalizeArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Show version and effective settings
    Info,
}
