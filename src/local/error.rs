// ABOUTME: Local process execution error types.
// ABOUTME: Separates missing executables, missing directories and timeouts from other spawn failures.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}: command not found. Ensure it is installed and on the PATH")]
    NotFound(String),

    /// The shell ran but could not find a command; carries what it printed.
    #[error("{stderr}. Ensure the command is installed and on the PATH")]
    ShellNotFound {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("working directory does not exist: {0}")]
    WorkingDirectory(PathBuf),

    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
