//! Scenario configuration model.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{E2eError, Result};

/// Configuration for one ddev interoperability scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Scenario name, used as the workspace directory prefix.
    pub name: String,
    /// Whether the harness runs in standalone execution mode.
    pub standalone: bool,
    /// Host OS on which the scenario is skipped (exact match).
    pub excluded_os: String,
    /// ddev release under test.
    pub ddev_version: String,
    /// mkcert release used to install the local CA.
    pub mkcert_version: String,
    /// Variable set to `"true"` for every invocation.
    pub debug_env_var: String,
    /// Per-step deadline in seconds. `None` waits indefinitely.
    pub step_timeout_secs: Option<u64>,
    /// Deadline in seconds for the final site request.
    pub http_timeout_secs: u64,
    /// Additional environment overrides applied to every invocation.
    pub extra_env: BTreeMap<String, String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: constants::SCENARIO_NAME.to_string(),
            standalone: false,
            excluded_os: constants::EXCLUDED_OS.to_string(),
            ddev_version: constants::DDEV_VERSION.to_string(),
            mkcert_version: constants::MKCERT_VERSION.to_string(),
            debug_env_var: constants::DEBUG_ENV_VAR.to_string(),
            step_timeout_secs: None,
            http_timeout_secs: constants::DEFAULT_HTTP_TIMEOUT_SECS,
            extra_env: BTreeMap::new(),
        }
    }
}

impl ScenarioConfig {
    /// Builds a configuration from defaults and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Loads a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| E2eError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the step timeout is not a whole number of seconds.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(constants::STANDALONE_ENV) {
            self.standalone = is_truthy(&value);
        }
        if let Some(value) = lookup(constants::STEP_TIMEOUT_ENV) {
            let secs = value.trim().parse::<u64>().map_err(|_| E2eError::Config {
                message: format!(
                    "{} must be a number of seconds, got {value:?}",
                    constants::STEP_TIMEOUT_ENV
                ),
            })?;
            self.step_timeout_secs = Some(secs);
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks that the configuration can produce valid URLs and deadlines.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("ddev_version", &self.ddev_version),
            ("mkcert_version", &self.mkcert_version),
            ("debug_env_var", &self.debug_env_var),
        ] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(E2eError::Config {
                    message: format!("{field} must be a non-empty token, got {value:?}"),
                });
            }
        }
        if self.step_timeout_secs == Some(0) {
            return Err(E2eError::Config {
                message: "step_timeout_secs must be greater than zero".into(),
            });
        }
        if self.http_timeout_secs == 0 {
            return Err(E2eError::Config {
                message: "http_timeout_secs must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Per-step deadline, if any.
    #[must_use]
    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }

    /// Deadline for the final site request.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
