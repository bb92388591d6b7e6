//! Formatted output helpers for CLI commands.

use ddev_e2e_scenario::{ScenarioOutcome, ScenarioReport};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Formats a millisecond count (e.g., "850ms", "12.3s", "2m 05s").
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_duration(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1_000.0)
    } else {
        let secs = ms / 1_000;
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

/// Prints a human-readable summary of a run on stderr.
pub fn print_report(report: &ScenarioReport) {
    eprintln!();
    eprintln!("  {BOLD}{}{RESET} {DIM}[{}]{RESET}", report.name, report.run_id);
    if let Some(url) = &report.site_url {
        eprintln!("  {DIM}site: {url}{RESET}");
    }
    if let Some(version) = &report.ddev_version_output {
        eprintln!("  {DIM}ddev: {}{RESET}", version.lines().next().unwrap_or_default());
    }
    eprintln!();

    for step in &report.steps {
        eprintln!(
            "    {GREEN}\u{25cf}{RESET} {:<44} {DIM}{}{RESET}",
            step.label,
            format_duration(step.elapsed_ms)
        );
    }
    for record in &report.teardown {
        let mark = if record.ok { GREEN } else { YELLOW };
        eprintln!("    {mark}\u{25cb}{RESET} teardown {}", record.step);
    }

    eprintln!();
    match &report.outcome {
        ScenarioOutcome::Passed => eprintln!("  {GREEN}{BOLD}PASSED{RESET}"),
        ScenarioOutcome::Failed { reason } => eprintln!("  {RED}{BOLD}FAILED{RESET} {reason}"),
        ScenarioOutcome::Skipped { reason } => eprintln!("  {YELLOW}{BOLD}SKIPPED{RESET} {reason}"),
    }
}
