//! qa-harness - scenario checklist and browser end-to-end runner
//!
//! Runs a catalog of scenarios either by asking an operator or by driving a
//! headless browser, then prints and saves a pass/fail report.

use clap::Parser;
use qa_harness::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "qa-harness", about = "Scenario checklist and browser test runner")]
#[command(version, long_about = None)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also write a detailed log file to the data directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Held until exit so the file writer flushes
    let _log_guard = if cli.log_file {
        logging::init_with_file(cli.verbose)
    } else {
        logging::init_cli(cli.verbose);
        None
    };

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
