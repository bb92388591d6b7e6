//! Fixed identifiers used to compute download URLs, image tags, and hostnames.

/// Default version of the ddev release under test.
pub const DDEV_VERSION: &str = "v1.18.2";

/// Version of the mkcert release used to install the local CA.
pub const MKCERT_VERSION: &str = "v1.4.3";

/// GitHub host serving release assets.
pub const RELEASE_HOST: &str = "github.com";

/// GitHub organisation publishing ddev.
pub const DDEV_ORG: &str = "drud";

/// Tool name, also used as the archive prefix and binary name.
pub const DDEV_TOOL: &str = "ddev";

/// Relative path of the extracted ddev binary inside the workspace.
pub const DDEV_BINARY: &str = "./ddev";

/// File name the mkcert download is saved under.
pub const MKCERT_BINARY: &str = "mkcert";

/// Domain suffix under which ddev publishes project sites.
pub const SITE_DOMAIN: &str = "ddev.site";

/// Name of the payload script written into the workspace.
pub const PAYLOAD_FILE: &str = "index.php";

/// Marker printed by the payload and expected in the site response.
pub const PAYLOAD_MARKER: &str = "ddev is working";

/// Environment variable enabling ddev debug output.
pub const DEBUG_ENV_VAR: &str = "DDEV_DEBUG";

/// Host OS on which ddev cannot run under this harness.
pub const EXCLUDED_OS: &str = "windows";

/// Default scenario name, used as the workspace prefix.
pub const SCENARIO_NAME: &str = "TestComposeRunDdev";

/// Program used to pull container images.
pub const CONTAINER_RUNTIME: &str = "docker";

/// Default timeout in seconds for the final site request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Environment variable that enables standalone execution mode.
pub const STANDALONE_ENV: &str = "DDEV_E2E_STANDALONE";

/// Environment variable carrying a per-step timeout in seconds.
pub const STEP_TIMEOUT_ENV: &str = "DDEV_E2E_STEP_TIMEOUT_SECS";

/// Images pulled at tags that do not follow the ddev version.
pub const PINNED_IMAGES: [&str; 3] = [
    "drud/ddev-ssh-agent:v1.18.0",
    "busybox:stable",
    "phpmyadmin:5",
];

/// Images pulled at the ddev version tag.
pub const VERSIONED_IMAGES: [&str; 3] = [
    "drud/ddev-router",
    "drud/ddev-dbserver-mariadb-10.3",
    "drud/ddev-webserver",
];
