use std::path::{Path, PathBuf};

use autoprobe_cli::config::Config;

pub struct CliContext {
    config: Config,
    config_path: Option<PathBuf>,
}

impl CliContext {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `None` when running on defaults.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
