//! Scenario runner
//!
//! Evaluates every scenario of a registry exactly once, in order. A failing
//! or erroring scenario never stops the run.

use std::time::Instant;

use colored::Colorize;

use crate::source::InteractionSource;

use super::{Outcome, ScenarioRegistry, ScenarioResult};

/// Run every scenario in `registry` against `source`
///
/// The returned vector has one result per scenario, in registry order.
pub async fn run<S>(registry: &ScenarioRegistry, source: &mut S) -> Vec<ScenarioResult>
where
    S: InteractionSource + ?Sized,
{
    let mut results = Vec::with_capacity(registry.len());
    let echo = source.echo_outcomes();

    for category in registry.categories() {
        if let Err(e) = source.begin_category(category).await {
            tracing::warn!(category = %category.name, error = %e, "Category setup failed");
        }

        for scenario in &category.scenarios {
            tracing::debug!(id = %scenario.id, "Evaluating scenario");
            let started = Instant::now();

            let outcome = match source.evaluate(scenario).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(id = %scenario.id, error = %e, "Scenario evaluation failed");
                    Outcome::Errored(e.to_string())
                }
            };

            let elapsed = started.elapsed();
            tracing::info!(
                id = %scenario.id,
                outcome = outcome.label(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Scenario finished"
            );

            if echo {
                print_outcome(&scenario.id, &scenario.description, &outcome);
            }

            results.push(ScenarioResult::new(scenario.clone(), outcome, elapsed));
        }
    }

    results
}

fn print_outcome(id: &str, description: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Passed => println!("  {} {} {}", "✓".green(), id, description.dimmed()),
        Outcome::Failed(reason) => {
            println!("  {} {} {}", "✗".red(), id, description.dimmed());
            println!("      {}", reason.red());
        }
        Outcome::Errored(reason) => {
            println!("  {} {} {}", "✗".red().bold(), id, description.dimmed());
            println!("      {} {}", "error:".red().bold(), reason);
        }
    }
}
