//! Scenario definitions and execution
//!
//! Scenarios are loaded from YAML catalogs into a registry, then run in
//! order against an interaction source.

mod outcome;
mod registry;
pub mod runner;
mod step;

pub use outcome::{Outcome, ScenarioResult};
pub use registry::{Category, Scenario, ScenarioRegistry};
pub use runner::run;
pub use step::{Locator, Step};
