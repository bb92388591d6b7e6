//! CLI command definitions and dispatch.

pub mod plan;
pub mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ddev_e2e_common::config::ScenarioConfig;

/// ddev-e2e: interoperability scenario runner for ddev.
#[derive(Parser, Debug)]
#[command(name = "ddev-e2e", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Path to a JSON scenario configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// ddev release to test (overrides the configuration file).
    #[arg(long, global = true)]
    pub ddev_version: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the scenario.
    Run(run::RunArgs),
    /// Print the ordered steps the scenario would perform.
    Plan(plan::PlanArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.ddev_version, |key| {
        std::env::var(key).ok()
    })?;
    match cli.command {
        Command::Run(args) => run::execute(args, config),
        Command::Plan(args) => plan::execute(&args, &config),
    }
}

/// Layers defaults, the file, the environment read through `lookup`, and
/// `--ddev-version`, in that order.
fn load_config<F>(
    path: Option<&std::path::Path>,
    ddev_version: Option<String>,
    lookup: F,
) -> anyhow::Result<ScenarioConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match path {
        Some(path) => ScenarioConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    let mut config = base
        .with_overrides(lookup)
        .context("reading environment overrides")?;
    if let Some(version) = ddev_version {
        config.ddev_version = version;
    }
    config.validate()?;
    Ok(config)
}
