//! Interaction sources
//!
//! An interaction source decides whether a scenario passed: either by asking
//! a human operator or by driving a browser and checking the page.

mod automated;
mod manual;

use async_trait::async_trait;

use crate::common::Result;
use crate::scenario::{Category, Outcome, Scenario};

pub use automated::{AutomatedSource, Driver, WaitPolicy};
pub use manual::{is_affirmative, ManualSource};

/// Trait for anything that can evaluate a scenario
#[async_trait]
pub trait InteractionSource: Send {
    /// Called once before the first scenario of each category
    async fn begin_category(&mut self, _category: &Category) -> Result<()> {
        Ok(())
    }

    /// Evaluate a single scenario
    ///
    /// An `Err` is treated by the runner as `Outcome::Errored`.
    async fn evaluate(&mut self, scenario: &Scenario) -> Result<Outcome>;

    /// Whether the runner should print a line per finished scenario
    fn echo_outcomes(&self) -> bool {
        true
    }
}
