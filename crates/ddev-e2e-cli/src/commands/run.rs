//! `ddev-e2e run`: Run the scenario against the real toolchain.

use std::path::PathBuf;

use clap::Args;
use ddev_e2e_common::config::ScenarioConfig;
use ddev_e2e_runtime::exec::ProcessExecutor;
use ddev_e2e_runtime::probe::ReqwestProbe;
use ddev_e2e_scenario::{ScenarioOutcome, ScenarioRunner};

use crate::output;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run in standalone execution mode. Without it, or a truthy
    /// `DDEV_E2E_STANDALONE`, the scenario is skipped.
    #[arg(long)]
    pub standalone: bool,

    /// Kill any single step that runs longer than this many seconds.
    /// Overrides `DDEV_E2E_STEP_TIMEOUT_SECS`.
    #[arg(long, value_name = "SECS")]
    pub step_timeout: Option<u64>,

    /// Directory to allocate the workspace in.
    #[arg(long, value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `run` command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the scenario fails.
pub fn execute(args: RunArgs, config: ScenarioConfig) -> anyhow::Result<()> {
    let config = apply_flags(&args, config)?;

    let probe = ReqwestProbe::new(config.http_timeout())?;
    let mut runner = ScenarioRunner::new(config, Box::new(ProcessExecutor::new()), Box::new(probe));
    if let Some(root) = args.workspace_root {
        runner = runner.with_workspace_root(root);
    }

    let report = runner.run();
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        output::print_report(&report);
    }

    exit_result(&report.outcome)
}

/// Applies `--standalone` and `--step-timeout` on top of file and env values.
pub(crate) fn apply_flags(
    args: &RunArgs,
    mut config: ScenarioConfig,
) -> anyhow::Result<ScenarioConfig> {
    if args.standalone {
        config.standalone = true;
    }
    if args.step_timeout.is_some() {
        config.step_timeout_secs = args.step_timeout;
    }
    config.validate()?;
    Ok(config)
}

/// Only a failed run is an error; a skip exits cleanly.
fn exit_result(outcome: &ScenarioOutcome) -> anyhow::Result<()> {
    match outcome {
        ScenarioOutcome::Failed { reason } => Err(anyhow::anyhow!("scenario failed: {reason}")),
        ScenarioOutcome::Passed | ScenarioOutcome::Skipped { .. } => Ok(()),
    }
}
