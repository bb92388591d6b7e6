//! Guaranteed release of the project and workspace.
//!
//! [`Teardown`] takes ownership of the workspace as soon as it exists.
//! Its steps run exactly once, either through [`Teardown::finish`] or when
//! the guard is dropped during an early return or a panic.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use ddev_e2e_common::constants::DDEV_BINARY;
use ddev_e2e_runtime::exec::{CommandExecutor, Invocation};
use ddev_e2e_runtime::workspace::Workspace;
use serde::{Deserialize, Serialize};

/// One teardown action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownStep {
    /// `ddev delete -O -y`.
    Delete,
    /// `ddev poweroff`.
    Poweroff,
    /// Recursive removal of the workspace.
    RemoveWorkspace,
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Poweroff => write!(f, "poweroff"),
            Self::RemoveWorkspace => write!(f, "remove-workspace"),
        }
    }
}

/// Result of one teardown action. Failures are recorded, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownRecord {
    /// Action that ran.
    pub step: TeardownStep,
    /// Whether it succeeded.
    pub ok: bool,
}

/// Scoped owner of the scenario's external resources.
pub struct Teardown<'a> {
    executor: &'a dyn CommandExecutor,
    base: Invocation,
    workspace: Option<Workspace>,
}

impl<'a> Teardown<'a> {
    /// Registers teardown for `workspace`. Commands inherit the directory,
    /// environment, and deadline of `base`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, base: &Invocation, workspace: Workspace) -> Self {
        let base = Invocation::new(DDEV_BINARY, workspace.path())
            .env(base.env.clone())
            .timeout(base.timeout);
        Self {
            executor,
            base,
            workspace: Some(workspace),
        }
    }

    /// Runs teardown now and returns what happened.
    pub fn finish(mut self) -> Vec<TeardownRecord> {
        self.release()
    }

    fn release(&mut self) -> Vec<TeardownRecord> {
        let Some(workspace) = self.workspace.take() else {
            return Vec::new();
        };
        tracing::info!(path = %workspace.path().display(), "tearing down");

        let delete = self.run(TeardownStep::Delete, &["delete", "-O", "-y"]);
        let poweroff = self.run(TeardownStep::Poweroff, &["poweroff"]);

        let path = workspace.path().to_path_buf();
        let removed = match workspace.remove() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "workspace removal failed");
                false
            }
        };

        vec![
            delete,
            poweroff,
            TeardownRecord {
                step: TeardownStep::RemoveWorkspace,
                ok: removed,
            },
        ]
    }

    fn run(&self, step: TeardownStep, args: &[&str]) -> TeardownRecord {
        let invocation = self.base.clone().args(args.iter().copied());
        // A panic escaping here while already unwinding would abort the process.
        let ok = match catch_unwind(AssertUnwindSafe(|| self.executor.run(&invocation))) {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::warn!(%step, error = %e, "teardown step failed");
                false
            }
            Err(_) => {
                tracing::warn!(%step, "teardown step panicked");
                false
            }
        };
        TeardownRecord { step, ok }
    }
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
