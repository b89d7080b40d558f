//! CLI command definitions
//!
//! Defines the clap commands for the scenario harness.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Walk through the manual checklist, answering each item
    Manual {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Run the browser suite against the target application
    #[command(alias = "e2e")]
    Auto {
        #[command(flatten)]
        run: RunArgs,

        /// Base URL of the application under test
        #[arg(long)]
        base_url: Option<String>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Skip the reachability check before launching the browser
        #[arg(long)]
        no_preflight: bool,
    },

    /// List the scenarios of a catalog
    #[command(alias = "ls")]
    List {
        /// List the browser suite instead of the manual checklist
        #[arg(long)]
        automated: bool,

        /// YAML catalog to list instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show the configuration file path and effective settings
    Config,
}

/// Options shared by both run modes
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// YAML catalog to run instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Report file (default from config)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Write the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not write a report file
    #[arg(long, conflicts_with = "report")]
    pub no_report: bool,

    /// Start without asking for confirmation
    #[arg(long, short)]
    pub yes: bool,
}
