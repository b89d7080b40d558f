//! Scenario execution and reporting harness
//!
//! Scenarios come from YAML catalogs, are evaluated one at a time by an
//! interaction source (a human operator or a browser driver), and end up in
//! a per-category pass/fail report.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod common;
pub mod report;
pub mod scenario;
pub mod source;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use report::{render, summarize, RunReport};
pub use scenario::{Category, Outcome, Scenario, ScenarioRegistry, ScenarioResult};
pub use source::{AutomatedSource, Driver, InteractionSource, ManualSource};
