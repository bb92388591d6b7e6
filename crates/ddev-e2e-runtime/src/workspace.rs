//! Per-scenario temporary workspace.

use std::path::Path;

use ddev_e2e_common::error::{E2eError, Result};
use ddev_e2e_common::types::SiteName;
use tempfile::TempDir;

/// Uniquely named directory owned by a single scenario run.
///
/// Dropping the workspace removes the directory recursively.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    site: SiteName,
}

impl Workspace {
    /// Allocates `<tmp>/<name>-<random>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create(name: &str) -> Result<Self> {
        Self::create_in(&std::env::temp_dir(), name)
    }

    /// Allocates `<parent>/<name>-<random>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn create_in(parent: &Path, name: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{name}-"))
            .tempdir_in(parent)
            .map_err(|e| E2eError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        let site = SiteName::from_workspace(dir.path())?;
        tracing::info!(path = %dir.path().display(), site = %site, "workspace created");
        Ok(Self { dir, site })
    }

    /// Absolute path of the workspace.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Site name derived from the workspace base name.
    #[must_use]
    pub const fn site_name(&self) -> &SiteName {
        &self.site
    }

    /// Removes the workspace recursively.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    pub fn remove(self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| E2eError::Io { path, source: e })
    }
}
