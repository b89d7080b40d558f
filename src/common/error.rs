//! Error types for the scenario harness
//!
//! Setup errors carry remediation hints so the operator knows what to fix
//! before re-running. Scenario-level errors never leave the runner; they are
//! folded into the scenario's outcome.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Setup Errors (block the whole automated run) ===
    #[error(
        "Could not start the browser: {0}\n\
         Setup:\n  \
         1. Install Chrome or Chromium (or set browser.executable in the config file)\n  \
         2. Start the application under test (e.g. 'npm run dev')\n  \
         3. Run this command again"
    )]
    DriverInit(String),

    #[error(
        "Target application not reachable at {url}: {error}\n\
         Start the application under test (e.g. 'npm run dev') or pass --base-url"
    )]
    TargetUnreachable { url: String, error: String },

    // === Scenario Errors (folded into the outcome of one scenario) ===
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {millis}ms waiting for {condition}")]
    WaitTimeout { condition: String, millis: u64 },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid step: {0}")]
    InvalidStep(String),

    // === Report Errors ===
    #[error("Failed to write report to '{path}': {error}")]
    SinkWrite { path: String, error: String },

    #[error("{passed}/{total} scenarios passed")]
    SuiteFailed { passed: usize, total: usize },

    #[error("Run interrupted by {0}; browser closed")]
    Interrupted(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid scenario catalog: {0}")]
    Catalog(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create a sink write error for the given path
    pub fn sink_write(path: &std::path::Path, error: impl ToString) -> Self {
        Self::SinkWrite {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a wait timeout error
    pub fn wait_timeout(condition: impl ToString, timeout: std::time::Duration) -> Self {
        Self::WaitTimeout {
            condition: condition.to_string(),
            millis: timeout.as_millis() as u64,
        }
    }

    /// Whether this error means "expected state not reached" rather than
    /// "the driver broke"
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Error::WaitTimeout { .. } | Error::ElementNotFound(_)
        )
    }
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        Error::Browser(e.to_string())
    }
}
