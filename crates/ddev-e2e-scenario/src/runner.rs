//! Scenario execution: guards, setup, pipeline, assertion, teardown.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ddev_e2e_common::config::ScenarioConfig;
use ddev_e2e_common::constants::{DDEV_BINARY, PAYLOAD_MARKER};
use ddev_e2e_common::error::{E2eError, Result};
use ddev_e2e_common::types::Platform;
use ddev_e2e_runtime::env::EnvOverlay;
use ddev_e2e_runtime::exec::{CommandExecutor, Invocation};
use ddev_e2e_runtime::probe::HttpProbe;
use ddev_e2e_runtime::puller::{ContainerPuller, DockerPuller};
use ddev_e2e_runtime::workspace::Workspace;
use uuid::Uuid;

use crate::plan::{Action, ScenarioPlan, Step};
use crate::report::{ScenarioOutcome, ScenarioReport, StepRecord};
use crate::teardown::Teardown;

/// Runs the ddev scenario against injected collaborators.
pub struct ScenarioRunner {
    config: ScenarioConfig,
    platform: Platform,
    executor: Box<dyn CommandExecutor>,
    probe: Box<dyn HttpProbe>,
    workspace_root: PathBuf,
}

impl ScenarioRunner {
    /// Creates a runner for the current platform, allocating workspaces
    /// under the system temporary directory.
    #[must_use]
    pub fn new(
        config: ScenarioConfig,
        executor: Box<dyn CommandExecutor>,
        probe: Box<dyn HttpProbe>,
    ) -> Self {
        Self {
            config,
            platform: Platform::current(),
            executor,
            probe,
            workspace_root: std::env::temp_dir(),
        }
    }

    /// Overrides the detected platform.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Allocates workspaces under `root` instead of the temporary directory.
    #[must_use]
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Returns why the scenario does not apply here, if it does not.
    #[must_use]
    pub fn skip_reason(&self) -> Option<String> {
        if !self.config.standalone {
            return Some("Not running on standalone mode.".into());
        }
        if self.platform.os == self.config.excluded_os {
            return Some(format!("Running on {}. Skipping...", self.platform.os));
        }
        None
    }

    /// Environment every invocation in a workspace runs with.
    #[must_use]
    pub fn overlay(&self, workspace: &Path) -> EnvOverlay {
        let overlay = self
            .config
            .extra_env
            .iter()
            .fold(EnvOverlay::new(), |overlay, (key, value)| {
                overlay.var(key.clone(), value.clone())
            });
        overlay
            .var(self.config.debug_env_var.clone(), "true")
            .append_path(workspace)
    }

    /// Runs the scenario to completion or first failure, then tears down.
    pub fn run(&self) -> ScenarioReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("scenario", name = %self.config.name, %run_id);
        let _entered = span.enter();
        let mut report = ScenarioReport::new(&self.config.name, run_id);

        if let Some(reason) = self.skip_reason() {
            tracing::info!(%reason, "scenario skipped");
            report.outcome = ScenarioOutcome::Skipped { reason };
            return report;
        }

        let workspace = match Workspace::create_in(&self.workspace_root, &self.config.name) {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::error!(error = %e, "workspace allocation failed");
                report.outcome = ScenarioOutcome::Failed {
                    reason: e.to_string(),
                };
                return report;
            }
        };
        let dir = workspace.path().to_path_buf();
        let plan = ScenarioPlan::new(
            &self.config,
            self.platform.clone(),
            workspace.site_name().clone(),
        );
        report.workspace = Some(dir.clone());
        report.site_url = Some(plan.site_url());

        let base = Invocation::new(DDEV_BINARY, &dir)
            .env(self.overlay(&dir))
            .timeout(self.config.step_timeout());
        let teardown = Teardown::new(self.executor.as_ref(), &base, workspace);

        let result = self.execute(&plan.steps(), &base, &mut report);
        report.outcome = match result {
            Ok(body) => verify(&plan.site_url(), body.as_deref()),
            Err(e) => {
                tracing::error!(error = %e, "scenario step failed");
                ScenarioOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        report.teardown = teardown.finish();

        tracing::info!(outcome = %report.outcome, "scenario finished");
        report
    }

    /// Runs every step in order, stopping at the first failure.
    /// Returns the body fetched by the probe step.
    fn execute(
        &self,
        steps: &[Step],
        base: &Invocation,
        report: &mut ScenarioReport,
    ) -> Result<Option<String>> {
        let puller = DockerPuller::new(self.executor.as_ref(), base);
        let mut body = None;

        for step in steps {
            tracing::info!(step = %step.label, action = %step.action, "step started");
            let started = Instant::now();

            match &step.action {
                Action::Run { program, args } => {
                    let _ = self.executor.run(&invocation(base, program, args))?;
                }
                Action::CaptureVersion { program, args } => {
                    let output = self.executor.run(&invocation(base, program, args))?;
                    let version = output.stdout.trim().to_string();
                    tracing::info!(%version, "ddev version");
                    report.ddev_version_output = Some(version);
                }
                Action::Pull(image) => puller.pull(image)?,
                Action::WriteFile { name, contents } => {
                    let path = base.dir.join(name);
                    std::fs::write(&path, contents)
                        .map_err(|e| E2eError::Io { path, source: e })?;
                }
                Action::Probe { url } => {
                    let response = self.probe.get(url)?;
                    tracing::info!(body = %response, "site response");
                    body = Some(response);
                }
            }

            report.steps.push(StepRecord {
                label: step.label.clone(),
                elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(body)
    }
}

fn invocation(base: &Invocation, program: &str, args: &[String]) -> Invocation {
    Invocation::new(program, base.dir.clone())
        .args(args.iter().cloned())
        .env(base.env.clone())
        .timeout(base.timeout)
}

fn verify(url: &str, body: Option<&str>) -> ScenarioOutcome {
    match body {
        Some(body) if body.contains(PAYLOAD_MARKER) => ScenarioOutcome::Passed,
        Some(_) => ScenarioOutcome::Failed {
            reason: format!("Could not start project: {url} did not return {PAYLOAD_MARKER:?}"),
        },
        None => ScenarioOutcome::Failed {
            reason: format!("Could not start project: {url} was never requested"),
        },
    }
}
