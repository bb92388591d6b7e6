//! Outcome and record of a scenario run.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ddev_e2e_common::error::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::teardown::TeardownRecord;

/// Final result of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScenarioOutcome {
    /// Every step succeeded and the site served the marker.
    Passed,
    /// A step failed or the site did not serve the marker.
    Failed {
        /// Description of the failure.
        reason: String,
    },
    /// A precondition was not met; nothing was run.
    Skipped {
        /// Why the scenario does not apply here.
        reason: String,
    },
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Timing of one completed pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step label.
    pub label: String,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

/// Everything observed during one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Identifier of this run.
    pub run_id: Uuid,
    /// When the run began.
    pub started_at: DateTime<Utc>,
    /// Workspace directory, once allocated.
    pub workspace: Option<PathBuf>,
    /// Site URL, once the workspace is known.
    pub site_url: Option<String>,
    /// Output of `ddev version`, if that step ran.
    pub ddev_version_output: Option<String>,
    /// Steps that completed successfully, in order.
    pub steps: Vec<StepRecord>,
    /// Teardown steps, in the order they ran.
    pub teardown: Vec<TeardownRecord>,
    /// Final result.
    pub outcome: ScenarioOutcome,
}

impl ScenarioReport {
    pub(crate) fn new(name: &str, run_id: Uuid) -> Self {
        Self {
            name: name.to_string(),
            run_id,
            started_at: Utc::now(),
            workspace: None,
            site_url: None,
            ddev_version_output: None,
            steps: Vec::new(),
            teardown: Vec::new(),
            outcome: ScenarioOutcome::Passed,
        }
    }

    /// Whether the scenario passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, ScenarioOutcome::Passed)
    }

    /// Whether the scenario failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        matches!(self.outcome, ScenarioOutcome::Failed { .. })
    }

    /// Whether the scenario was skipped.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        matches!(self.outcome, ScenarioOutcome::Skipped { .. })
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&ScenarioOutcome::Skipped {
            reason: "Not running on standalone mode.".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"status":"skipped","reason":"Not running on standalone mode."}"#
        );
        let json = serde_json::to_string(&ScenarioOutcome::Passed).unwrap();
        assert_eq!(json, r#"{"status":"passed"}"#);
    }

    #[test]
    fn report_json_roundtrip_keeps_outcome() {
        let mut report = ScenarioReport::new("TestX", Uuid::new_v4());
        report.outcome = ScenarioOutcome::Failed {
            reason: "boom".into(),
        };
        let json = report.to_json().unwrap();
        let parsed: ScenarioReport = serde_json::from_str(&json).unwrap();
        assert!(parsed.failed());
        assert_eq!(parsed.run_id, report.run_id);
    }

    #[test]
    fn outcome_display_includes_reason() {
        let outcome = ScenarioOutcome::Failed {
            reason: "start exited with code 1".into(),
        };
        assert_eq!(outcome.to_string(), "failed: start exited with code 1");
    }
}
