//! Unified error types for the ddev-e2e workspace.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum E2eError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The external program could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The external program exited with a non-zero status.
    #[error(
        "{} exited with code {exit_code}: {}",
        command_line(.program, .args),
        .stderr.trim()
    )]
    CommandFailed {
        /// Program that was run.
        program: String,
        /// Arguments passed to the program.
        args: Vec<String>,
        /// Exit code, or `-1` when terminated by a signal.
        exit_code: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The external program did not finish before its deadline.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout {
        /// Program that was killed.
        program: String,
        /// Deadline that expired.
        timeout: Duration,
    },

    /// An HTTP request failed before a body was received.
    #[error("request to {url} failed: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, E2eError>;

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
