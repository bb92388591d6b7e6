//! Fail-fast execution of external programs.
//!
//! Every invocation carries its own working directory, environment overlay,
//! and optional deadline. A non-zero exit is returned as
//! [`E2eError::CommandFailed`] so callers abort with `?`.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use ddev_e2e_common::error::{E2eError, Result};

use crate::env::EnvOverlay;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name, either bare (searched on the path) or a relative path.
    pub program: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Working directory of the child.
    pub dir: PathBuf,
    /// Environment changes applied to the child.
    pub env: EnvOverlay,
    /// Deadline after which the child is killed.
    pub timeout: Option<Duration>,
}

impl Invocation {
    /// Creates an invocation of `program` inside `dir`.
    #[must_use]
    pub fn new(program: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: dir.into(),
            env: EnvOverlay::default(),
            timeout: None,
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replaces the environment overlay.
    #[must_use]
    pub fn env(mut self, env: EnvOverlay) -> Self {
        self.env = env;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Program and arguments joined with spaces, for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output from a completed invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code returned by the command.
    pub exit_code: i32,
}

/// Runs external programs with fail-fast semantics.
///
/// Implementations must return [`E2eError::CommandFailed`] for any non-zero
/// exit and share no state between calls other than the filesystem.
pub trait CommandExecutor: Send + Sync {
    /// Runs the invocation to completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be found or started, exits
    /// non-zero, or exceeds its deadline.
    fn run(&self, invocation: &Invocation) -> Result<ExecOutput>;
}

impl<T: CommandExecutor + ?Sized> CommandExecutor for std::sync::Arc<T> {
    fn run(&self, invocation: &Invocation) -> Result<ExecOutput> {
        (**self).run(invocation)
    }
}

/// Executor that spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Creates a new process executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandExecutor for ProcessExecutor {
    fn run(&self, invocation: &Invocation) -> Result<ExecOutput> {
        tracing::info!(
            program = %invocation.program,
            args = ?invocation.args,
            dir = %invocation.dir.display(),
            "running command"
        );
        let started = Instant::now();

        let search_path = invocation.env.search_path(std::env::var_os("PATH"))?;
        let resolved = which::which_in(&invocation.program, Some(&search_path), &invocation.dir)
            .map_err(|_| E2eError::NotFound {
                kind: "program",
                id: invocation.program.clone(),
            })?;

        let mut child = Command::new(&resolved)
            .args(&invocation.args)
            .current_dir(&invocation.dir)
            .env("PATH", &search_path)
            .envs(invocation.env.vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| E2eError::Spawn {
                program: invocation.program.clone(),
                source: e,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = wait_with_deadline(&mut child, invocation)?;

        let output = ExecOutput {
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
            exit_code: status.code().unwrap_or(-1),
        };
        tracing::debug!(
            program = %invocation.program,
            exit_code = output.exit_code,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "command finished"
        );

        if !status.success() {
            return Err(E2eError::CommandFailed {
                program: invocation.program.clone(),
                args: invocation.args.clone(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

/// Reads a child pipe to the end on a background thread.
fn drain<R>(pipe: Option<R>) -> JoinHandle<String>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn wait_with_deadline(child: &mut Child, invocation: &Invocation) -> Result<ExitStatus> {
    let io_err = |e| E2eError::Io {
        path: PathBuf::from(&invocation.program),
        source: e,
    };

    let Some(timeout) = invocation.timeout else {
        return child.wait().map_err(io_err);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(io_err)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            tracing::warn!(program = %invocation.program, ?timeout, "command deadline expired, killing");
            let _ = child.kill();
            let _ = child.wait();
            return Err(E2eError::Timeout {
                program: invocation.program.clone(),
                timeout,
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
