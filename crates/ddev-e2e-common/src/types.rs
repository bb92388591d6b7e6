//! Domain primitive types used across the ddev-e2e workspace.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{DDEV_ORG, DDEV_TOOL, RELEASE_HOST, SITE_DOMAIN};
use crate::error::{E2eError, Result};

/// Host platform identifiers as reported by the Rust standard library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system name (`linux`, `macos`, `windows`, ...).
    pub os: String,
    /// CPU architecture name (`x86_64`, `aarch64`, ...).
    pub arch: String,
}

impl Platform {
    /// Creates a platform from explicit identifiers.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Returns the platform this process is running on.
    #[must_use]
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// OS name as used in ddev release asset names.
    ///
    /// Unknown platforms pass through unchanged.
    #[must_use]
    pub fn release_os(&self) -> &str {
        match self.os.as_str() {
            "darwin" | "macos" => "macos",
            other => other,
        }
    }

    /// Architecture name as used in ddev release asset names.
    #[must_use]
    pub fn release_arch(&self) -> &str {
        match self.arch.as_str() {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            other => other,
        }
    }

    /// File name of the ddev release archive for this platform.
    #[must_use]
    pub fn archive_filename(&self, version: &str) -> String {
        format!(
            "{DDEV_TOOL}_{}-{}.{version}.tar.gz",
            self.release_os(),
            self.release_arch()
        )
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Download URL of a ddev release asset.
#[must_use]
pub fn ddev_release_url(version: &str, filename: &str) -> String {
    format!("https://{RELEASE_HOST}/{DDEV_ORG}/{DDEV_TOOL}/releases/download/{version}/{filename}")
}

/// Download URL of the mkcert release binary.
#[must_use]
pub fn mkcert_release_url(version: &str) -> String {
    format!(
        "https://{RELEASE_HOST}/FiloSottile/mkcert/releases/download/{version}/mkcert-{version}-linux-amd64"
    )
}

/// Fully qualified container image reference (`name:tag`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(String);

impl ImageRef {
    /// Creates an image reference from a complete `name:tag` string.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Creates a reference for `image` at tag `version`.
    #[must_use]
    pub fn tagged(image: &str, version: &str) -> Self {
        Self(format!("{image}:{version}"))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Project name ddev derives from the workspace directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteName(String);

impl SiteName {
    /// Creates a site name from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derives the site name from the final segment of a workspace path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path has no UTF-8 final segment.
    pub fn from_workspace(path: &Path) -> Result<Self> {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(Self::new)
            .ok_or_else(|| E2eError::Config {
                message: format!("workspace path has no usable base name: {}", path.display()),
            })
    }

    /// Returns the hostname the project is served under.
    #[must_use]
    pub fn hostname(&self) -> String {
        format!("{}.{SITE_DOMAIN}", self.0)
    }

    /// Returns the plain-HTTP URL of the project.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.hostname())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn archive_filename_maps_darwin_to_macos() {
        let platform = Platform::new("darwin", "amd64");
        assert_eq!(
            platform.archive_filename("v1.18.2"),
            "ddev_macos-amd64.v1.18.2.tar.gz"
        );
    }

    #[test]
    fn archive_filename_maps_rust_identifiers() {
        let platform = Platform::new("linux", "x86_64");
        assert_eq!(
            platform.archive_filename("v1.18.2"),
            "ddev_linux-amd64.v1.18.2.tar.gz"
        );
        let platform = Platform::new("macos", "aarch64");
        assert_eq!(
            platform.archive_filename("v1.18.2"),
            "ddev_macos-arm64.v1.18.2.tar.gz"
        );
    }

    #[test]
    fn unknown_os_passes_through_unchanged() {
        let platform = Platform::new("freebsd", "riscv64");
        assert_eq!(
            platform.archive_filename("v1.18.2"),
            "ddev_freebsd-riscv64.v1.18.2.tar.gz"
        );
    }

    #[test]
    fn ddev_release_url_follows_github_layout() {
        assert_eq!(
            ddev_release_url("v1.18.2", "ddev_linux-amd64.v1.18.2.tar.gz"),
            "https://github.com/drud/ddev/releases/download/v1.18.2/ddev_linux-amd64.v1.18.2.tar.gz"
        );
    }

    #[test]
    fn mkcert_release_url_is_versioned() {
        assert_eq!(
            mkcert_release_url("v1.4.3"),
            "https://github.com/FiloSottile/mkcert/releases/download/v1.4.3/mkcert-v1.4.3-linux-amd64"
        );
    }

    #[test]
    fn tagged_image_appends_version() {
        let image = ImageRef::tagged("drud/ddev-router", "v1.18.2");
        assert_eq!(image.as_str(), "drud/ddev-router:v1.18.2");
    }

    #[test]
    fn site_url_uses_workspace_basename() {
        let site = SiteName::from_workspace(&PathBuf::from("/tmp/TestX-482910")).unwrap();
        assert_eq!(site.as_str(), "TestX-482910");
        assert_eq!(site.url(), "http://TestX-482910.ddev.site");
    }

    #[test]
    fn site_name_rejects_root_path() {
        assert!(SiteName::from_workspace(Path::new("/")).is_err());
    }
}
