//! CLI command handling
//!
//! Wires configuration, catalogs, interaction sources and reports together
//! for each subcommand.

use std::future::Future;
use std::path::Path;

use colored::Colorize;

use crate::browser::{self, BrowserSession};
use crate::commands::{Commands, RunArgs};
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::report::{self, ReportFormat, RunReport};
use crate::scenario::{self, ScenarioRegistry, ScenarioResult};
use crate::source::{AutomatedSource, ManualSource, WaitPolicy};

/// Which suite a command works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Manual,
    Automated,
}

impl Mode {
    fn next_steps(self) -> &'static [&'static str] {
        match self {
            Mode::Manual => &[
                "Fix the items that failed",
                "Run the automated suite ('qa-harness auto')",
                "Add unit tests for the failing areas",
                "Document the bugs found",
            ],
            Mode::Automated => &[
                "Fix the scenarios that failed",
                "Confirm the remaining items with the manual checklist ('qa-harness manual')",
                "Wire this command into CI; it exits non-zero when anything fails",
            ],
        }
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Manual { run } => {
            let config = Config::load()?;
            let registry = load_registry(run.catalog.as_deref(), Mode::Manual)?;
            let report_path = run
                .report
                .clone()
                .unwrap_or_else(|| config.report.manual_path.clone());

            print_banner(&registry, Mode::Manual, &config.target.base_url);

            let mut source = ManualSource::stdio();
            if !run.yes && !source.confirm("Press Enter to start (n to cancel):", true).await? {
                println!("Validation cancelled.");
                return Ok(());
            }

            let results = scenario::run(&registry, &mut source).await;
            finish(&registry, &results, &run, &report_path, Mode::Manual)
        }

        Commands::Auto {
            run,
            base_url,
            headed,
            no_preflight,
        } => {
            let mut config = Config::load()?;
            if let Some(url) = base_url {
                config.target.base_url = url;
            }
            if headed {
                config.browser.headless = false;
            }
            if no_preflight {
                config.target.preflight = false;
            }

            let registry = load_registry(run.catalog.as_deref(), Mode::Automated)?;
            let report_path = run
                .report
                .clone()
                .unwrap_or_else(|| config.report.automated_path.clone());

            print_banner(&registry, Mode::Automated, &config.target.base_url);

            if !run.yes
                && !ManualSource::stdio()
                    .confirm("Run the suite? (y/n):", false)
                    .await?
            {
                println!("Run cancelled by the operator.");
                return Ok(());
            }

            let results = run_automated(&registry, &config).await?;
            finish(&registry, &results, &run, &report_path, Mode::Automated)
        }

        Commands::List { automated, catalog } => {
            let mode = if automated {
                Mode::Automated
            } else {
                Mode::Manual
            };
            let registry = load_registry(catalog.as_deref(), mode)?;
            print_registry(&registry);
            Ok(())
        }

        Commands::Config => {
            match paths::config_path() {
                Some(path) if path.exists() => println!("Config file: {}", path.display()),
                Some(path) => println!("Config file: {} (not present, using defaults)", path.display()),
                None => println!("Config file: unavailable on this platform"),
            }
            println!();
            print!("{}", Config::load()?.to_toml()?);
            Ok(())
        }
    }
}

fn load_registry(catalog: Option<&Path>, mode: Mode) -> Result<ScenarioRegistry> {
    match (catalog, mode) {
        (Some(path), _) => ScenarioRegistry::from_file(path),
        (None, Mode::Manual) => ScenarioRegistry::builtin_manual(),
        (None, Mode::Automated) => ScenarioRegistry::builtin_automated(),
    }
}

/// Launch the browser, run every scenario, and always release the browser
///
/// SIGINT/SIGTERM stop the run between driver calls so the browser is closed
/// instead of being orphaned by the default signal handler.
async fn run_automated(registry: &ScenarioRegistry, config: &Config) -> Result<Vec<ScenarioResult>> {
    if config.target.preflight {
        browser::preflight(&config.target.base_url).await?;
    }

    println!("\n{}", "Starting browser...".cyan());
    let session = BrowserSession::launch(&config.browser).await?;
    println!("  {} Browser ready", "✓".green());
    println!("\n{}", "Scenarios:".cyan());

    let mut source = AutomatedSource::new(
        session,
        config.target.base_url.clone(),
        WaitPolicy::from(&config.browser),
    );
    let outcome = until_shutdown(scenario::run(registry, &mut source), shutdown_signal()).await;

    if let Err(e) = source.into_driver().close().await {
        tracing::warn!(error = %e, "Browser did not shut down cleanly");
    }

    outcome
}

/// Drive `work` to completion unless `shutdown` resolves first
async fn until_shutdown<T>(
    work: impl Future<Output = T>,
    shutdown: impl Future<Output = &'static str>,
) -> Result<T> {
    tokio::select! {
        done = work => Ok(done),
        signal = shutdown => {
            tracing::info!(signal, "Received {}, stopping the run", signal);
            Err(Error::Interrupted(signal.to_string()))
        }
    }
}

/// Resolves with the signal's name once the process is asked to stop
#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Could not install signal handlers");
                return std::future::pending().await;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "Ctrl+C",
        Err(e) => {
            tracing::warn!(error = %e, "Could not install Ctrl+C handler");
            std::future::pending().await
        }
    }
}

/// Summarize, print and persist a finished run
fn finish(
    registry: &ScenarioRegistry,
    results: &[ScenarioResult],
    run: &RunArgs,
    report_path: &Path,
    mode: Mode,
) -> Result<()> {
    let mut report = report::summarize(results, registry.categories());
    if let Some(title) = registry.title() {
        report = report.with_title(title);
    }

    println!();
    print_report(&report);

    println!("\n{}", "Next steps:".cyan().bold());
    for (i, step) in mode.next_steps().iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }

    if !run.no_report {
        let format = if run.json {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        };
        println!("\nSaving report to {}...", report_path.display());
        match report::persist_to_path(&report, report_path, format) {
            Ok(()) => println!("  {} Report saved", "✓".green()),
            Err(e) => eprintln!("  {} {}", "✗".red(), e),
        }
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(Error::SuiteFailed {
            passed: report.passed,
            total: report.total,
        })
    }
}

fn print_banner(registry: &ScenarioRegistry, mode: Mode, base_url: &str) {
    let heading = match mode {
        Mode::Manual => "Manual validation",
        Mode::Automated => "End-to-end run",
    };
    println!("{}", "=".repeat(60));
    println!("{}", registry.title().unwrap_or(heading).blue().bold());
    println!("{}", "=".repeat(60));
    println!(
        "{} scenarios in {} categories.",
        registry.len(),
        registry.categories().len()
    );
    println!("Make sure the application is running at {}", base_url);
    println!();
}

fn print_report(report: &RunReport) {
    for line in report::render(report).lines() {
        let colored = match line.chars().next() {
            Some('✓') => line.green().to_string(),
            Some('!') => line.yellow().to_string(),
            Some('✗') => line.red().to_string(),
            _ if line.starts_with("  ✗") => line.red().to_string(),
            _ => line.to_string(),
        };
        println!("{}", colored);
    }
}

fn print_registry(registry: &ScenarioRegistry) {
    if let Some(title) = registry.title() {
        println!("{}", title.bold());
    }
    for category in registry.categories() {
        println!("\n{} ({})", category.name.cyan(), category.len());
        if let Some(instructions) = &category.instructions {
            println!("  {}", instructions.dimmed());
        }
        for scenario in &category.scenarios {
            if scenario.steps.is_empty() {
                println!("  {}  {}", scenario.id.bold(), scenario.description);
            } else {
                println!(
                    "  {}  {} {}",
                    scenario.id.bold(),
                    scenario.description,
                    format!("({} steps)", scenario.steps.len()).dimmed()
                );
            }
        }
    }
    println!("\n{} scenarios total", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Category, Outcome, Scenario};
    use std::time::Duration;

    fn registry(ids: &[&str]) -> ScenarioRegistry {
        let scenarios = ids.iter().map(|id| Scenario::new(*id, "check")).collect();
        ScenarioRegistry::new(vec![Category::new("Only", scenarios)]).unwrap()
    }

    fn results(registry: &ScenarioRegistry, passing: usize) -> Vec<ScenarioResult> {
        registry
            .scenarios()
            .iter()
            .enumerate()
            .map(|(i, s)| ScenarioResult {
                scenario: s.clone(),
                outcome: if i < passing {
                    Outcome::Passed
                } else {
                    Outcome::Failed("no".into())
                },
                duration: Duration::ZERO,
            })
            .collect()
    }

    fn no_report() -> RunArgs {
        RunArgs {
            no_report: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_finish_fails_below_full_pass() {
        let registry = registry(&["T001", "T002", "T004"]);
        let err = finish(
            &registry,
            &results(&registry, 2),
            &no_report(),
            Path::new("unused.txt"),
            Mode::Manual,
        )
        .unwrap_err();

        assert!(matches!(err, Error::SuiteFailed { passed: 2, total: 3 }), "{:?}", err);
    }

    #[test]
    fn test_finish_ok_when_everything_passed() {
        let registry = registry(&["T001", "T002"]);
        let outcome = finish(
            &registry,
            &results(&registry, 2),
            &no_report(),
            Path::new("unused.txt"),
            Mode::Automated,
        );
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_finish_ok_for_empty_registry() {
        let registry = ScenarioRegistry::new(Vec::new()).unwrap();
        let outcome = finish(&registry, &[], &no_report(), Path::new("unused.txt"), Mode::Manual);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_finish_persists_and_still_reports_failure() {
        let registry = registry(&["T001", "T002"]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        let err = finish(
            &registry,
            &results(&registry, 1),
            &RunArgs::default(),
            &path,
            Mode::Manual,
        )
        .unwrap_err();

        assert!(matches!(err, Error::SuiteFailed { .. }));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Total: 1/2 passed (50.0%)"), "{}", text);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_the_run() {
        let outcome = until_shutdown(std::future::pending::<()>(), async { "SIGTERM" }).await;
        assert!(matches!(outcome, Err(Error::Interrupted(ref s)) if s == "SIGTERM"));
    }

    #[tokio::test]
    async fn test_run_completes_without_shutdown() {
        let outcome = until_shutdown(async { 7 }, std::future::pending()).await;
        assert_eq!(outcome.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_shutdown_leaves_source_reusable() {
        // The run is dropped at a suspension point; the source it borrowed is
        // handed back intact so the browser can still be closed
        struct Hanging(usize);

        #[async_trait::async_trait]
        impl crate::source::InteractionSource for Hanging {
            async fn evaluate(&mut self, _scenario: &Scenario) -> Result<Outcome> {
                self.0 += 1;
                std::future::pending().await
            }

            fn echo_outcomes(&self) -> bool {
                false
            }
        }

        let registry = registry(&["T001", "T002"]);
        let mut source = Hanging(0);
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            "SIGINT"
        };

        let outcome = until_shutdown(scenario::run(&registry, &mut source), shutdown).await;

        assert!(matches!(outcome, Err(Error::Interrupted(_))));
        assert_eq!(source.0, 1);
    }
}
