//! The ordered pipeline of steps a scenario performs.
//!
//! Steps are plain data so the same list drives execution and the
//! `plan` command.

use std::fmt;

use ddev_e2e_common::config::ScenarioConfig;
use ddev_e2e_common::constants::{
    CONTAINER_RUNTIME, DDEV_BINARY, MKCERT_BINARY, PAYLOAD_FILE, PINNED_IMAGES, VERSIONED_IMAGES,
};
use ddev_e2e_common::types::{self, ImageRef, Platform, SiteName};

/// Payload served by the project. Running it prints the marker string.
pub const PAYLOAD: &str = "<?php\nprint \"ddev is working\";\n";

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Runs a program inside the workspace.
    Run {
        /// Program name or workspace-relative path.
        program: String,
        /// Arguments.
        args: Vec<String>,
    },
    /// Runs a program and keeps its standard output for the report.
    CaptureVersion {
        /// Program name or workspace-relative path.
        program: String,
        /// Arguments.
        args: Vec<String>,
    },
    /// Pulls a container image.
    Pull(ImageRef),
    /// Writes a file into the workspace.
    WriteFile {
        /// File name relative to the workspace.
        name: String,
        /// File contents.
        contents: String,
    },
    /// Fetches the site and keeps the response body.
    Probe {
        /// Site URL.
        url: String,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run { program, args } | Self::CaptureVersion { program, args } => {
                write!(f, "{program}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Self::Pull(image) => write!(f, "{CONTAINER_RUNTIME} pull {image}"),
            Self::WriteFile { name, contents } => {
                write!(f, "write {name} ({} bytes)", contents.len())
            }
            Self::Probe { url } => write!(f, "GET {url}"),
        }
    }
}

/// One labelled pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Short identifier used in logs and the report.
    pub label: String,
    /// The work to perform.
    pub action: Action,
}

impl Step {
    fn run(label: &str, program: &str, args: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            action: Action::Run {
                program: program.to_string(),
                args: args.iter().map(ToString::to_string).collect(),
            },
        }
    }

    fn pull(image: ImageRef) -> Self {
        Self {
            label: format!("pull {image}"),
            action: Action::Pull(image),
        }
    }
}

/// Inputs that fully determine the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPlan {
    /// Host platform the release archive is chosen for.
    pub platform: Platform,
    /// ddev release under test.
    pub ddev_version: String,
    /// mkcert release used to install the local CA.
    pub mkcert_version: String,
    /// Project name derived from the workspace.
    pub site: SiteName,
}

impl ScenarioPlan {
    /// Creates a plan from a configuration, platform, and site name.
    #[must_use]
    pub fn new(config: &ScenarioConfig, platform: Platform, site: SiteName) -> Self {
        Self {
            platform,
            ddev_version: config.ddev_version.clone(),
            mkcert_version: config.mkcert_version.clone(),
            site,
        }
    }

    /// Release archive file name for the plan's platform and version.
    #[must_use]
    pub fn archive_filename(&self) -> String {
        self.platform.archive_filename(&self.ddev_version)
    }

    /// URL the final check requests.
    #[must_use]
    pub fn site_url(&self) -> String {
        self.site.url()
    }

    /// Images pulled before the project starts, in pull order.
    #[must_use]
    pub fn images(&self) -> Vec<ImageRef> {
        PINNED_IMAGES
            .iter()
            .map(|image| ImageRef::new(*image))
            .chain(
                VERSIONED_IMAGES
                    .iter()
                    .map(|image| ImageRef::tagged(image, &self.ddev_version)),
            )
            .collect()
    }

    /// The full ordered pipeline.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        let archive = self.archive_filename();
        let archive_url = types::ddev_release_url(&self.ddev_version, &archive);
        let mkcert_url = types::mkcert_release_url(&self.mkcert_version);

        let mut steps = vec![
            Step::run("download-ddev", "curl", &["-LO", &archive_url]),
            Step::run("extract-ddev", "tar", &["-xzf", &archive]),
            Step::run(
                "download-mkcert",
                "curl",
                &["-L", "-o", MKCERT_BINARY, &mkcert_url],
            ),
            Step::run("chmod-mkcert", "chmod", &["a+x", MKCERT_BINARY]),
            Step::run("install-mkcert", MKCERT_BINARY, &["-install"]),
        ];
        steps.extend(self.images().into_iter().map(Step::pull));
        steps.push(Step {
            label: "write-payload".into(),
            action: Action::WriteFile {
                name: PAYLOAD_FILE.into(),
                contents: PAYLOAD.into(),
            },
        });
        steps.push(Step::run("config-auto", DDEV_BINARY, &["config", "--auto"]));
        steps.push(Step::run(
            "config-compose",
            DDEV_BINARY,
            &["config", "global", "--use-docker-compose-from-path"],
        ));
        steps.push(Step {
            label: "version".into(),
            action: Action::CaptureVersion {
                program: DDEV_BINARY.into(),
                args: vec!["version".into()],
            },
        });
        steps.push(Step::run("poweroff", DDEV_BINARY, &["poweroff"]));
        steps.push(Step::run("start", DDEV_BINARY, &["start", "-y"]));
        steps.push(Step {
            label: "probe".into(),
            action: Action::Probe {
                url: self.site_url(),
            },
        });
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> ScenarioPlan {
        ScenarioPlan::new(
            &ScenarioConfig::default(),
            Platform::new("linux", "x86_64"),
            SiteName::new("TestX-482910"),
        )
    }

    #[test]
    fn steps_follow_fixed_order() {
        let labels: Vec<String> = plan().steps().into_iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                "download-ddev",
                "extract-ddev",
                "download-mkcert",
                "chmod-mkcert",
                "install-mkcert",
                "pull drud/ddev-ssh-agent:v1.18.0",
                "pull busybox:stable",
                "pull phpmyadmin:5",
                "pull drud/ddev-router:v1.18.2",
                "pull drud/ddev-dbserver-mariadb-10.3:v1.18.2",
                "pull drud/ddev-webserver:v1.18.2",
                "write-payload",
                "config-auto",
                "config-compose",
                "version",
                "poweroff",
                "start",
                "probe",
            ]
        );
    }

    #[test]
    fn download_uses_release_url_for_platform() {
        let steps = plan().steps();
        assert_eq!(
            steps[0].action.to_string(),
            "curl -LO https://github.com/drud/ddev/releases/download/v1.18.2/ddev_linux-amd64.v1.18.2.tar.gz"
        );
        assert_eq!(
            steps[1].action.to_string(),
            "tar -xzf ddev_linux-amd64.v1.18.2.tar.gz"
        );
    }

    #[test]
    fn mkcert_is_downloaded_made_executable_and_installed() {
        let steps = plan().steps();
        assert_eq!(
            steps[2].action.to_string(),
            "curl -L -o mkcert https://github.com/FiloSottile/mkcert/releases/download/v1.4.3/mkcert-v1.4.3-linux-amd64"
        );
        assert_eq!(steps[3].action.to_string(), "chmod a+x mkcert");
        assert_eq!(steps[4].action.to_string(), "mkcert -install");
    }

    #[test]
    fn versioned_images_follow_configured_ddev_version() {
        let config = ScenarioConfig {
            ddev_version: "v1.19.0".into(),
            ..ScenarioConfig::default()
        };
        let plan = ScenarioPlan::new(&config, Platform::current(), SiteName::new("s"));
        let images: Vec<String> = plan.images().iter().map(ToString::to_string).collect();
        assert!(images.contains(&"drud/ddev-router:v1.19.0".to_string()));
        assert!(images.contains(&"drud/ddev-ssh-agent:v1.18.0".to_string()));
        assert!(images.contains(&"busybox:stable".to_string()));
    }

    #[test]
    fn probe_targets_site_url() {
        let steps = plan().steps();
        let last = steps.last().unwrap();
        assert_eq!(
            last.action,
            Action::Probe {
                url: "http://TestX-482910.ddev.site".into()
            }
        );
    }

    #[test]
    fn payload_is_two_lines_printing_marker() {
        assert_eq!(PAYLOAD.lines().count(), 2);
        assert_eq!(PAYLOAD.lines().next(), Some("<?php"));
        assert!(PAYLOAD.contains("print \"ddev is working\";"));
    }
}
