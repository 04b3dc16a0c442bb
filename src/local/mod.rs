// ABOUTME: Local child-process execution with a deadline.
// ABOUTME: Runs programs directly or through the platform shell and captures both streams.

mod error;

pub use error::{Error, Result};

use crate::command::CommandLine;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Exit status the shell uses when it cannot find the named command.
#[cfg(unix)]
const SHELL_NOT_FOUND_EXIT: i32 = 127;
#[cfg(windows)]
const SHELL_NOT_FOUND_EXIT: i32 = 9009;

/// Options for a single local run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            working_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RunOptions {
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Output of a local process that ran to completion.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// None when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run a command locally and wait for it, up to `options.timeout`.
///
/// A non-zero exit is not an error: the output comes back with the exit
/// code. When the deadline passes the child is killed and its output is
/// discarded.
pub async fn run(command: &CommandLine, options: &RunOptions) -> Result<ProcessOutput> {
    if let Some(dir) = &options.working_dir {
        if !dir.is_dir() {
            return Err(Error::WorkingDirectory(dir.clone()));
        }
    }

    let mut cmd = build_command(command);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &options.working_dir {
        cmd.current_dir(dir);
    }

    tracing::debug!(command = %command, timeout = ?options.timeout, "running local command");

    let child = cmd.spawn().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(command.executable().to_string())
        } else {
            Error::Spawn {
                program: command.executable().to_string(),
                source,
            }
        }
    })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(options.timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            tracing::warn!(command = %command, "local command timed out");
            return Err(Error::Timeout(options.timeout));
        }
    };

    let exit_code = output.status.code();
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    // The shell reports a missing command with this status and a message on
    // stderr. A bare `exit 127` prints nothing and stays an ordinary exit.
    if let (CommandLine::Shell(_), Some(SHELL_NOT_FOUND_EXIT)) = (command, exit_code) {
        if !stderr.trim().is_empty() {
            return Err(Error::ShellNotFound {
                exit_code: SHELL_NOT_FOUND_EXIT,
                stdout,
                stderr: stderr.trim().to_string(),
            });
        }
    }

    tracing::debug!(?exit_code, "local command finished");

    Ok(ProcessOutput {
        exit_code,
        stdout,
        stderr,
    })
}

fn build_command(command: &CommandLine) -> Command {
    match command {
        CommandLine::Program { program, args } => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            cmd
        }
        CommandLine::Shell(script) => shell_command(script),
    }
}

#[cfg(unix)]
fn shell_command(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

#[cfg(windows)]
fn shell_command(script: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(script);
    cmd
}
