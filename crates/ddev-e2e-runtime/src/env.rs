//! Per-invocation environment overrides.
//!
//! The overlay is applied to each spawned child and never to the current
//! process, so concurrent scenarios cannot observe each other's settings.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use ddev_e2e_common::error::{E2eError, Result};

/// Environment changes applied to a spawned process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverlay {
    path_append: Vec<PathBuf>,
    vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a directory to the back of the executable search path.
    #[must_use]
    pub fn append_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_append.push(dir.into());
        self
    }

    /// Sets an environment variable.
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.vars.insert(key.into(), value.into());
        self
    }

    /// Environment variables set by this overlay.
    #[must_use]
    pub const fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Directories appended to the search path.
    #[must_use]
    pub fn appended_paths(&self) -> &[PathBuf] {
        &self.path_append
    }

    /// Computes the child's `PATH` from an inherited value.
    ///
    /// # Errors
    ///
    /// Returns an error if an appended directory contains the path separator.
    pub fn search_path(&self, inherited: Option<OsString>) -> Result<OsString> {
        let mut dirs: Vec<PathBuf> = inherited
            .as_ref()
            .map(|p| std::env::split_paths(p).collect())
            .unwrap_or_default();
        dirs.extend(self.path_append.iter().cloned());
        std::env::join_paths(dirs).map_err(|e| E2eError::Config {
            message: format!("cannot build search path: {e}"),
        })
    }
}
