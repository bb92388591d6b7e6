//! `ddev-e2e plan`: Display the scenario's steps without running them.

use clap::Args;
use ddev_e2e_common::config::ScenarioConfig;
use ddev_e2e_common::types::{Platform, SiteName};
use ddev_e2e_scenario::plan::ScenarioPlan;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Workspace base name to show in the site URL.
    #[arg(long, default_value = "TestComposeRunDdev-XXXXXX")]
    pub site_name: String,

    /// Operating system to plan for (defaults to the host).
    #[arg(long)]
    pub os: Option<String>,

    /// CPU architecture to plan for (defaults to the host).
    #[arg(long)]
    pub arch: Option<String>,
}

/// Executes the `plan` command.
///
/// # Errors
///
/// This command does not currently fail.
#[allow(clippy::unnecessary_wraps)]
pub fn execute(args: &PlanArgs, config: &ScenarioConfig) -> anyhow::Result<()> {
    let host = Platform::current();
    let platform = Platform::new(
        args.os.clone().unwrap_or(host.os),
        args.arch.clone().unwrap_or(host.arch),
    );
    let plan = ScenarioPlan::new(config, platform, SiteName::new(args.site_name.clone()));
    let steps = plan.steps();

    println!("Scenario Plan: {} ({})", config.name, plan.platform);
    println!("{}", "\u{2550}".repeat(35));
    println!();
    for (i, step) in steps.iter().enumerate() {
        println!("  {:>2}. {:<44} {}", i + 1, step.label, step.action);
    }
    println!();
    println!("  Teardown (always runs):");
    println!("      ./ddev delete -O -y");
    println!("      ./ddev poweroff");
    println!("      remove workspace");
    println!();
    println!("  {} step(s); site {}", steps.len(), plan.site_url());

    Ok(())
}
