//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Application under test
    #[serde(default)]
    pub target: TargetConfig,

    /// Browser automation settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Report sink settings
    #[serde(default)]
    pub report: ReportSettings,
}

/// Where the application under test lives
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TargetConfig {
    /// Base address all scripted navigation is relative to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Check that the target answers HTTP before launching the browser
    #[serde(default = "default_true")]
    pub preflight: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            preflight: true,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_true() -> bool {
    true
}

/// Browser automation settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BrowserSettings {
    /// Run without a visible window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Chrome/Chromium executable; searched on PATH when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    /// Extra command line arguments for the browser
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    /// Bounded wait for each DOM condition
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,

    /// Interval between condition polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Timeout for the browser process to come up
    #[serde(default = "default_launch_timeout")]
    pub launch_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            args: default_browser_args(),
            wait_timeout_secs: default_wait_timeout(),
            poll_interval_ms: default_poll_interval(),
            launch_timeout_secs: default_launch_timeout(),
        }
    }
}

impl BrowserSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }
}

fn default_browser_args() -> Vec<String> {
    vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
    ]
}
fn default_wait_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    250
}
fn default_launch_timeout() -> u64 {
    20
}

/// Report sink settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportSettings {
    /// Report written after a manual checklist run
    #[serde(default = "default_manual_report")]
    pub manual_path: PathBuf,

    /// Report written after an automated run
    #[serde(default = "default_automated_report")]
    pub automated_path: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            manual_path: default_manual_report(),
            automated_path: default_automated_report(),
        }
    }
}

fn default_manual_report() -> PathBuf {
    PathBuf::from("test_validation_report.txt")
}
fn default_automated_report() -> PathBuf {
    PathBuf::from("test_run_report.txt")
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| super::Error::Config(e.to_string()))
    }
}
