//! Scenario runner tests against recording collaborators.
//!
//! Covers:
//! 1. Skip guards (standalone mode, excluded OS) perform no invocations
//! 2. A fully successful run passes with three teardown records
//! 3. A failure at any pipeline position still tears down, in order
//! 4. Panics inside the pipeline still tear down
//! 5. Every invocation runs in the workspace with the scenario overlay
//! 6. The live pipeline, when explicitly enabled

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ddev_e2e_common::config::ScenarioConfig;
use ddev_e2e_common::error::{E2eError, Result};
use ddev_e2e_common::types::Platform;
use ddev_e2e_runtime::exec::{CommandExecutor, ExecOutput, Invocation, ProcessExecutor};
use ddev_e2e_runtime::probe::{HttpProbe, ReqwestProbe};
use ddev_e2e_scenario::teardown::TeardownStep;
use ddev_e2e_scenario::{ScenarioOutcome, ScenarioRunner};

/// Number of executor calls the pipeline makes before teardown.
const PIPELINE_CALLS: usize = 16;

#[derive(Default)]
struct FakeExecutor {
    calls: Mutex<Vec<Invocation>>,
    fail_at: Option<usize>,
    panic_at: Option<usize>,
    payload_seen: Mutex<Option<String>>,
}

impl FakeExecutor {
    fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    fn panicking_at(index: usize) -> Self {
        Self {
            panic_at: Some(index),
            ..Self::default()
        }
    }

    fn command_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }
}

impl CommandExecutor for FakeExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ExecOutput> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(invocation.clone());
            calls.len() - 1
        };

        if invocation.args == ["config", "--auto"] {
            let payload = std::fs::read_to_string(invocation.dir.join("index.php")).ok();
            *self.payload_seen.lock().unwrap() = payload;
        }
        if self.panic_at == Some(index) {
            panic!("executor panicked at call {index}");
        }
        if self.fail_at == Some(index) {
            return Err(E2eError::CommandFailed {
                program: invocation.program.clone(),
                args: invocation.args.clone(),
                exit_code: 1,
                stdout: String::new(),
                stderr: format!("forced failure at call {index}"),
            });
        }

        let stdout = if invocation.args == ["version"] {
            "ddev version v1.18.2\n".to_string()
        } else {
            String::new()
        };
        Ok(ExecOutput {
            stdout,
            stderr: String::new(),
            exit_code: 0,
        })
    }
}

struct StubProbe {
    body: Option<&'static str>,
    requests: Mutex<Vec<String>>,
}

impl StubProbe {
    fn serving(body: &'static str) -> Self {
        Self {
            body: Some(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        Self {
            body: None,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl HttpProbe for StubProbe {
    fn get(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.body.map(str::to_string).ok_or_else(|| E2eError::Http {
            url: url.to_string(),
            message: "connection refused".into(),
        })
    }
}

fn standalone() -> ScenarioConfig {
    ScenarioConfig {
        name: "TestComposeRunDdev".into(),
        standalone: true,
        ..ScenarioConfig::default()
    }
}

fn runner(
    config: ScenarioConfig,
    executor: &Arc<FakeExecutor>,
    probe: &Arc<StubProbe>,
    root: &Path,
) -> ScenarioRunner {
    ScenarioRunner::new(config, Box::new(Arc::clone(executor)), Box::new(Arc::clone(probe)))
        .with_platform(Platform::new("linux", "x86_64"))
        .with_workspace_root(root)
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

fn assert_teardown_tail(lines: &[String]) {
    let tail = &lines[lines.len() - 2..];
    assert_eq!(tail, ["./ddev delete -O -y", "./ddev poweroff"]);
}

// ── Skip guards ──────────────────────────────────────────────────────

#[test]
fn excluded_os_is_skipped_without_invocations() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("ddev is working"));

    let report = runner(standalone(), &executor, &probe, root.path())
        .with_platform(Platform::new("windows", "x86_64"))
        .run();

    assert!(report.skipped());
    assert!(executor.calls.lock().unwrap().is_empty());
    assert!(probe.requests.lock().unwrap().is_empty());
    assert!(report.teardown.is_empty());
    assert!(report.workspace.is_none());
    assert!(is_empty_dir(root.path()));
}

#[test]
fn non_standalone_mode_is_skipped_without_invocations() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("ddev is working"));

    let report = runner(ScenarioConfig::default(), &executor, &probe, root.path()).run();

    assert_eq!(
        report.outcome,
        ScenarioOutcome::Skipped {
            reason: "Not running on standalone mode.".into()
        }
    );
    assert!(executor.calls.lock().unwrap().is_empty());
    assert!(probe.requests.lock().unwrap().is_empty());
    assert!(is_empty_dir(root.path()));
}

// ── Successful run ───────────────────────────────────────────────────

#[test]
fn successful_run_passes_and_tears_down() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("ddev is working"));

    let report = runner(standalone(), &executor, &probe, root.path()).run();

    assert!(report.passed(), "unexpected outcome: {}", report.outcome);
    assert_eq!(report.teardown.len(), 3);
    assert!(report.teardown.iter().all(|r| r.ok));
    assert_eq!(report.steps.len(), 18);
    assert_eq!(report.ddev_version_output.as_deref(), Some("ddev version v1.18.2"));

    let lines = executor.command_lines();
    assert_eq!(lines.len(), PIPELINE_CALLS + 2);
    assert_teardown_tail(&lines);
    assert!(is_empty_dir(root.path()));
}

#[test]
fn successful_run_issues_pipeline_in_order() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("<p>ddev is working</p>"));

    let report = runner(standalone(), &executor, &probe, root.path()).run();
    assert!(report.passed());

    assert_eq!(
        executor.command_lines(),
        vec![
            "curl -LO https://github.com/drud/ddev/releases/download/v1.18.2/ddev_linux-amd64.v1.18.2.tar.gz",
            "tar -xzf ddev_linux-amd64.v1.18.2.tar.gz",
            "curl -L -o mkcert https://github.com/FiloSottile/mkcert/releases/download/v1.4.3/mkcert-v1.4.3-linux-amd64",
            "chmod a+x mkcert",
            "mkcert -install",
            "docker pull drud/ddev-ssh-agent:v1.18.0",
            "docker pull busybox:stable",
            "docker pull phpmyadmin:5",
            "docker pull drud/ddev-router:v1.18.2",
            "docker pull drud/ddev-dbserver-mariadb-10.3:v1.18.2",
            "docker pull drud/ddev-webserver:v1.18.2",
            "./ddev config --auto",
            "./ddev config global --use-docker-compose-from-path",
            "./ddev version",
            "./ddev poweroff",
            "./ddev start -y",
            "./ddev delete -O -y",
            "./ddev poweroff",
        ]
    );
}

#[test]
fn probe_requests_workspace_site() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("ddev is working"));

    let report = runner(standalone(), &executor, &probe, root.path()).run();

    let workspace = report.workspace.expect("workspace recorded");
    let base = workspace.file_name().unwrap().to_str().unwrap().to_string();
    assert!(base.starts_with("TestComposeRunDdev-"));
    let expected = format!("http://{base}.ddev.site");
    assert_eq!(*probe.requests.lock().unwrap(), vec![expected.clone()]);
    assert_eq!(report.site_url, Some(expected));
}

#[test]
fn payload_exists_before_project_is_configured() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("ddev is working"));

    let _ = runner(standalone(), &executor, &probe, root.path()).run();

    let payload = executor.payload_seen.lock().unwrap().clone();
    assert_eq!(
        payload.as_deref(),
        Some("<?php\nprint \"ddev is working\";\n")
    );
}

#[test]
fn every_invocation_runs_in_workspace_with_overlay() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("ddev is working"));
    let config = ScenarioConfig {
        step_timeout_secs: Some(900),
        ..standalone()
    };

    let report = runner(config, &executor, &probe, root.path()).run();
    let workspace: PathBuf = report.workspace.expect("workspace recorded");

    for call in executor.calls.lock().unwrap().iter() {
        assert_eq!(call.dir, workspace, "{}", call.command_line());
        assert_eq!(
            call.env.vars().get("DDEV_DEBUG").map(String::as_str),
            Some("true")
        );
        assert_eq!(call.env.appended_paths(), [workspace.clone()]);
        assert_eq!(call.timeout, Some(Duration::from_secs(900)));
    }
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn failure_at_any_position_still_tears_down_in_order() {
    for index in 0..PIPELINE_CALLS {
        let root = tempfile::tempdir().unwrap();
        let executor = Arc::new(FakeExecutor::failing_at(index));
        let probe = Arc::new(StubProbe::serving("ddev is working"));

        let report = runner(standalone(), &executor, &probe, root.path()).run();

        assert!(report.failed(), "call {index} should fail the scenario");
        let lines = executor.command_lines();
        assert_eq!(lines.len(), index + 3, "pipeline must stop at call {index}");
        assert_teardown_tail(&lines);

        let steps: Vec<TeardownStep> = report.teardown.iter().map(|r| r.step).collect();
        assert_eq!(
            steps,
            vec![
                TeardownStep::Delete,
                TeardownStep::Poweroff,
                TeardownStep::RemoveWorkspace
            ]
        );
        assert!(probe.requests.lock().unwrap().is_empty());
        assert!(is_empty_dir(root.path()), "workspace left behind at call {index}");
    }
}

#[test]
fn failed_step_reason_carries_captured_output() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::failing_at(PIPELINE_CALLS - 1));
    let probe = Arc::new(StubProbe::serving("ddev is working"));

    let report = runner(standalone(), &executor, &probe, root.path()).run();

    match report.outcome {
        ScenarioOutcome::Failed { reason } => {
            assert!(reason.contains("./ddev start -y"), "{reason}");
            assert!(reason.contains("forced failure"), "{reason}");
        }
        other => panic!("unexpected outcome: {other}"),
    }
}

#[test]
fn missing_marker_fails_after_full_pipeline() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::serving("<h1>404 page not found</h1>"));

    let report = runner(standalone(), &executor, &probe, root.path()).run();

    match &report.outcome {
        ScenarioOutcome::Failed { reason } => {
            assert!(reason.starts_with("Could not start project"), "{reason}");
        }
        other => panic!("unexpected outcome: {other}"),
    }
    assert_eq!(report.teardown.len(), 3);
    assert_teardown_tail(&executor.command_lines());
    assert!(is_empty_dir(root.path()));
}

#[test]
fn unreachable_site_fails_and_tears_down() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::default());
    let probe = Arc::new(StubProbe::unreachable());

    let report = runner(standalone(), &executor, &probe, root.path()).run();

    assert!(report.failed());
    assert_eq!(report.teardown.len(), 3);
    assert!(is_empty_dir(root.path()));
}

#[test]
fn panic_inside_pipeline_still_tears_down() {
    let root = tempfile::tempdir().unwrap();
    let executor = Arc::new(FakeExecutor::panicking_at(1));
    let probe = Arc::new(StubProbe::serving("ddev is working"));
    let scenario = runner(standalone(), &executor, &probe, root.path());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| scenario.run()));

    assert!(result.is_err());
    let lines = executor.command_lines();
    assert_eq!(lines.len(), 4);
    assert_teardown_tail(&lines);
    assert!(is_empty_dir(root.path()));
}

// ── Payload ──────────────────────────────────────────────────────────

#[test]
#[ignore = "Requires php on PATH"]
fn payload_prints_marker_when_interpreted() {
    let php = which::which("php").expect("php should be installed");
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("index.php");
    std::fs::write(&script, ddev_e2e_scenario::plan::PAYLOAD).unwrap();

    let output = std::process::Command::new(php)
        .arg(&script)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "ddev is working");
}

// ── Live ─────────────────────────────────────────────────────────────

#[test]
#[ignore = "Requires network access, Docker, and DDEV_E2E_STANDALONE=1"]
fn live_ddev_scenario() {
    let config = ScenarioConfig::from_env().unwrap();
    let probe = ReqwestProbe::new(config.http_timeout()).unwrap();
    let report =
        ScenarioRunner::new(config, Box::new(ProcessExecutor::new()), Box::new(probe)).run();

    assert!(!report.failed(), "{}", report.outcome);
    if let Some(workspace) = report.workspace {
        assert!(!workspace.exists());
    }
}
