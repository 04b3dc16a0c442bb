// ABOUTME: Uniform command execution against the local machine or a remote host.
// ABOUTME: Every failure is folded into a CommandResult; nothing escapes as an error.

use crate::command::CommandLine;
use crate::local::{self, RunOptions};
use crate::retry::RetryPolicy;
use crate::secret::Secret;
use crate::ssh::{self, Session, SessionConfig};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Why a command did not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Remote host rejected the credentials.
    Authentication,
    /// Remote host key was unknown (with first-use trust off) or changed.
    HostKey,
    /// Host unreachable, connection refused, handshake or connect timeout.
    Transport,
    /// Command exceeded its execution deadline.
    Timeout,
    /// Executable or working directory missing.
    NotFound,
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Authentication => "authentication",
            FailureKind::HostKey => "host key",
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
            FailureKind::NotFound => "not found",
            FailureKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

/// Outcome of one command invocation.
///
/// `stdout` and `stderr` are always present and trimmed. When the command
/// could not be run, `failure` is set and `stderr` carries the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub failure: Option<FailureKind>,
}

impl CommandResult {
    pub fn completed(exit_code: Option<i32>, stdout: &str, stderr: &str) -> Self {
        Self {
            stdout: stdout.trim().to_string(),
            stderr: stderr.trim().to_string(),
            exit_code,
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: None,
            failure: Some(kind),
        }
    }

    /// The command ran and exited with status 0.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.exit_code == Some(0)
    }

    /// The `(stdout, stderr)` pair.
    pub fn into_pair(self) -> (String, String) {
        (self.stdout, self.stderr)
    }
}

impl From<local::Error> for CommandResult {
    fn from(err: local::Error) -> Self {
        if let local::Error::ShellNotFound {
            exit_code, stdout, ..
        } = &err
        {
            // The shell did run: keep what it printed before giving up.
            return CommandResult {
                stdout: stdout.trim().to_string(),
                stderr: err.to_string(),
                exit_code: Some(*exit_code),
                failure: Some(FailureKind::NotFound),
            };
        }
        let kind = match &err {
            local::Error::NotFound(_)
            | local::Error::ShellNotFound { .. }
            | local::Error::WorkingDirectory(_) => FailureKind::NotFound,
            local::Error::Timeout(_) => FailureKind::Timeout,
            local::Error::Spawn { .. } | local::Error::Io(_) => FailureKind::Unexpected,
        };
        CommandResult::failed(kind, err.to_string())
    }
}

impl From<ssh::Error> for CommandResult {
    fn from(err: ssh::Error) -> Self {
        match &err {
            ssh::Error::AuthenticationFailed { .. }
            | ssh::Error::AgentUnavailable(_)
            | ssh::Error::KeyLoadFailed { .. }
            | ssh::Error::Key(_) => CommandResult::failed(
                FailureKind::Authentication,
                format!("{err}. Check the username and password or key"),
            ),
            ssh::Error::HostKeyRejected { .. } => CommandResult::failed(
                FailureKind::HostKey,
                format!("{err}. Verify the host key in known_hosts"),
            ),
            ssh::Error::Connection { port, .. } | ssh::Error::ConnectTimeout { port, .. } => {
                CommandResult::failed(
                    FailureKind::Transport,
                    format!(
                        "{err}. Ensure the SSH service is running and the firewall allows port {port}"
                    ),
                )
            }
            ssh::Error::Protocol(_) | ssh::Error::ChannelClosed | ssh::Error::Io(_) => {
                CommandResult::failed(FailureKind::Transport, format!("SSH connection error: {err}"))
            }
            ssh::Error::CommandTimeout(_) => {
                CommandResult::failed(FailureKind::Timeout, err.to_string())
            }
            ssh::Error::CommandFailed(_) => {
                CommandResult::failed(FailureKind::Unexpected, err.to_string())
            }
        }
    }
}

impl From<ssh::CommandOutput> for CommandResult {
    fn from(output: ssh::CommandOutput) -> Self {
        let exit_code = output.exit_code.and_then(|code| i32::try_from(code).ok());
        CommandResult::completed(exit_code, &output.stdout, &output.stderr)
    }
}

impl From<local::ProcessOutput> for CommandResult {
    fn from(output: local::ProcessOutput) -> Self {
        CommandResult::completed(output.exit_code, &output.stdout, &output.stderr)
    }
}

/// Runs commands somewhere and reports a [`CommandResult`].
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, command: &CommandLine) -> CommandResult;
}

/// Runs commands as child processes of this process.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor {
    options: RunOptions,
}

impl LocalExecutor {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }
}

#[async_trait]
impl Executor for LocalExecutor {
    async fn execute(&self, command: &CommandLine) -> CommandResult {
        match local::run(command, &self.options).await {
            Ok(output) => output.into(),
            Err(e) => {
                tracing::debug!(command = %command, "local command failed: {}", e);
                e.into()
            }
        }
    }
}

/// Runs each command in a fresh SSH session that is closed afterwards.
#[derive(Debug, Clone)]
pub struct RemoteExecutor {
    config: SessionConfig,
    retry: RetryPolicy,
}

impl RemoteExecutor {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            retry: RetryPolicy::none(),
        }
    }

    /// Retry transient connect failures. The command itself is never re-run.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn try_execute(&self, command: &CommandLine) -> ssh::Result<ssh::CommandOutput> {
        let session = self
            .retry
            .run(|| Session::connect(self.config.clone()))
            .await?;

        let output = session.exec(&command.to_remote_string()).await;

        if let Err(e) = session.disconnect().await {
            tracing::warn!(host = %self.config.host, "SSH disconnect failed: {}", e);
        }

        output
    }
}

#[async_trait]
impl Executor for RemoteExecutor {
    async fn execute(&self, command: &CommandLine) -> CommandResult {
        tracing::info!(host = %self.config.host, command = %command, "executing remote command");
        match self.try_execute(command).await {
            Ok(output) => output.into(),
            Err(e) => {
                tracing::debug!(host = %self.config.host, "remote command failed: {}", e);
                e.into()
            }
        }
    }
}

/// Where an invocation runs.
#[derive(Debug, Clone)]
pub enum Target {
    Local { working_dir: Option<PathBuf> },
    Remote(SessionConfig),
}

/// One command bound to a target and a deadline.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub target: Target,
    pub command: CommandLine,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Invocation {
    pub fn local(command: CommandLine) -> Self {
        Self {
            target: Target::Local { working_dir: None },
            command,
            timeout: local::DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
        }
    }

    pub fn remote(config: SessionConfig, command: CommandLine) -> Self {
        let timeout = config.command_timeout;
        Self {
            target: Target::Remote(config),
            command,
            timeout,
            retry: RetryPolicy::none(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Executor configured for this invocation's target and deadline.
    pub fn executor(&self) -> Box<dyn Executor> {
        match &self.target {
            Target::Local { working_dir } => {
                let mut options = RunOptions::default().timeout(self.timeout);
                options.working_dir = working_dir.clone();
                Box::new(LocalExecutor::new(options))
            }
            Target::Remote(config) => Box::new(
                RemoteExecutor::new(config.clone().command_timeout(self.timeout))
                    .with_retry(self.retry.clone()),
            ),
        }
    }
}

/// Run an invocation to completion.
pub async fn run(invocation: &Invocation) -> CommandResult {
    invocation.executor().execute(&invocation.command).await
}

/// Run `command` on `host` with password authentication and default timeouts.
pub async fn execute_remote(
    host: &str,
    username: &str,
    password: Secret,
    command: &CommandLine,
) -> CommandResult {
    let config = SessionConfig::new(host, username).password(password);
    RemoteExecutor::new(config).execute(command).await
}

/// Run `command` locally with the default timeout.
pub async fn execute_local(command: &CommandLine, working_dir: Option<&Path>) -> CommandResult {
    let mut options = RunOptions::default();
    options.working_dir = working_dir.map(Path::to_path_buf);
    LocalExecutor::new(options).execute(command).await
}
