//! Scenario outcomes and results

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use super::Scenario;

/// Verdict for one scenario evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// The expected state was not reached
    Failed(String),
    /// The evaluation itself broke (driver error, bad script)
    Errored(String),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// Reason for a non-passing outcome
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(reason) | Outcome::Errored(reason) => Some(reason),
        }
    }

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed(_) => "FAILED",
            Outcome::Errored(_) => "ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{} - {}", self.label(), reason),
            None => f.write_str(self.label()),
        }
    }
}

/// Result of evaluating one scenario in a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub outcome: Outcome,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl ScenarioResult {
    pub fn new(scenario: Scenario, outcome: Outcome, duration: Duration) -> Self {
        Self {
            scenario,
            outcome,
            duration,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_passed()
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
