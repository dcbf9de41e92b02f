//! Configuration loading
//!
//! YAML file (explicit path, `config/autoprobe.yaml`, then the user config
//! directory), followed by environment overrides and validation.

use crate::llm::OpenAiConfig;
use action_locator::HealerConfig;
use action_primitives::InteractionTimeouts;
use cdp_adapter::CdpConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "AUTOPROBE_LLM_MODEL";
pub const API_BASE_ENV: &str = "AUTOPROBE_LLM_API_BASE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserSettings,
    pub timeouts: InteractionTimeouts,
    pub healer: HealerSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
    pub no_sandbox: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub launch_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            user_data_dir: None,
            window_width: 1280,
            window_height: 800,
            no_sandbox: false,
            launch_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealerSettings {
    pub enabled: bool,
    pub dom_snapshot_chars: usize,
}

impl Default for HealerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dom_snapshot_chars: HealerConfig::default().dom_snapshot_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Never written back out by `config show`
    #[serde(skip_serializing)]
    pub api_keys: Vec<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            api_keys: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `OPENAI_API_KEY`, `AUTOPROBE_LLM_MODEL` and `AUTOPROBE_LLM_API_BASE`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(API_KEY_ENV) {
            let keys: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect();
            if !keys.is_empty() {
                self.llm.api_keys = keys;
            }
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|value| !value.trim().is_empty()) {
            self.llm.model = model.trim().to_string();
        }
        if let Some(base) = lookup(API_BASE_ENV).filter(|value| !value.trim().is_empty()) {
            self.llm.api_base = base.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = &self.timeouts;
        if timeouts.action_ms == 0 || timeouts.navigation_ms == 0 || timeouts.network_idle_ms == 0
        {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }
        if self.healer.dom_snapshot_chars == 0 {
            return Err(ConfigError::Invalid(
                "healer.dom_snapshot_chars must be non-zero".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must be set".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(
                "llm.temperature must be between 0 and 2".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cdp_config(&self) -> CdpConfig {
        let browser = &self.browser;
        CdpConfig {
            headless: browser.headless,
            executable: browser.executable.clone().unwrap_or_default(),
            user_data_dir: browser.user_data_dir.clone(),
            window: (browser.window_width, browser.window_height),
            no_sandbox: browser.no_sandbox,
            launch_args: browser.launch_args.clone(),
            ..CdpConfig::default()
        }
    }

    pub fn healer_config(&self) -> HealerConfig {
        HealerConfig {
            dom_snapshot_chars: self.healer.dom_snapshot_chars,
        }
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_keys: self.llm.api_keys.clone(),
            model: self.llm.model.clone(),
            api_base: self.llm.api_base.clone(),
            temperature: self.llm.temperature,
            timeout: Duration::from_secs(self.llm.timeout_secs),
        }
    }
}

pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from; `None` when defaults were used
    pub path: Option<PathBuf>,
}

/// Candidate files, most specific first.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config/autoprobe.yaml")];
    if let Some(mut dir) = dirs::config_dir() {
        dir.push("autoprobe");
        dir.push("config.yaml");
        paths.push(dir);
    }
    paths
}

/// Load, override from the environment and validate.
///
/// An explicit path must exist; the default locations are optional.
pub async fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = match explicit {
        Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => Some(path.to_path_buf()),
        None => default_config_paths().into_iter().find(|path| path.exists()),
    };

    let mut config = match &path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
            let config = Config::from_yaml(path, &text)?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => {
            warn!("Config file not found, using defaults");
            Config::default()
        }
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(LoadedConfig { config, path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            Path::new("inline.yaml"),
            "browser:\n  headless: false\ntimeouts:\n  action_ms: 5000\n",
        )
        .unwrap();
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_width, 1280);
        assert_eq!(config.timeouts.action_ms, 5000);
        assert_eq!(config.timeouts.navigation_ms, 30_000);
        assert!(config.healer.enabled);
        assert_eq!(config.healer.dom_snapshot_chars, 4000);
    }

    #[test]
    fn env_overrides_split_key_list() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (API_KEY_ENV, "sk-one, sk-two,,"),
            (MODEL_ENV, "gpt-4o"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(config.llm.api_keys, vec!["sk-one", "sk-two"]);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn rejects_zero_timeouts_and_snapshot() {
        let mut config = Config::default();
        config.timeouts.action_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.healer.dom_snapshot_chars = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn api_keys_are_not_serialized() {
        let mut config = Config::default();
        config.llm.api_keys = vec!["sk-secret".to_string()];
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-secret"));
    }

    #[test]
    fn maps_browser_settings_to_cdp() {
        let mut config = Config::default();
        config.browser.window_width = 800;
        config.browser.headless = false;
        let cdp = config.cdp_config();
        assert_eq!(cdp.window, (800, 800));
        assert!(!cdp.headless);
        assert_eq!(cdp.poll_interval_ms, 100);
    }

    #[tokio::test]
    #[serial]
    async fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "healer:\n  enabled: false\nllm:\n  model: local-model").unwrap();

        let loaded = load_config(Some(file.path())).await.unwrap();
        assert_eq!(loaded.path.as_deref(), Some(file.path()));
        assert!(!loaded.config.healer.enabled);
        if env::var(MODEL_ENV).is_err() {
            assert_eq!(loaded.config.llm.model, "local-model");
        }
    }

    #[tokio::test]
    async fn missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/autoprobe.yaml"))).await;
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_yaml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeouts: [not, a, map]").unwrap();

        let err = load_config(Some(file.path())).await.err().unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
