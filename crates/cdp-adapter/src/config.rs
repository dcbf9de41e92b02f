use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, time::Duration};
use which::which;

/// Environment variable naming an explicit Chromium binary.
pub const CHROME_PATH_ENV: &str = "AUTOPROBE_CHROME_PATH";

/// Configuration for launching Chromium and polling the page.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    pub headless: bool,
    /// Empty means auto-detect.
    pub executable: PathBuf,
    pub user_data_dir: Option<PathBuf>,
    pub window: (u32, u32),
    pub no_sandbox: bool,
    pub launch_args: Vec<String>,
    pub launch_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub network_quiet_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: PathBuf::new(),
            user_data_dir: None,
            window: (1280, 800),
            no_sandbox: false,
            launch_args: Vec::new(),
            launch_timeout_ms: 20_000,
            request_timeout_ms: 30_000,
            poll_interval_ms: 100,
            network_quiet_ms: 500,
        }
    }
}

impl CdpConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn network_quiet(&self) -> Duration {
        Duration::from_millis(self.network_quiet_ms)
    }

    /// Executable to launch: the configured one when it exists, else detection.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        if !self.executable.as_os_str().is_empty() && self.executable.exists() {
            return Some(self.executable.clone());
        }
        detect_chrome_executable()
    }
}

pub(crate) fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var(CHROME_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    chrome_executable_names()
        .iter()
        .find_map(|name| which(name).ok())
}

pub(crate) fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ]
    }
}
