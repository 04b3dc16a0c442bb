// ABOUTME: SSH session management using russh.
// ABOUTME: Handles connection, password/key/agent authentication, and single-command execution.

use super::auth::Prepared;
use super::error::{Error, Result};
use super::host_key::HostKeyCheck;
use crate::secret::Secret;
use russh::client::{self, Handle};
use russh::{ChannelMsg, Disconnect, Sig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Interval between keepalive requests while waiting on a quiet command.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);
/// Unanswered keepalives before the server is considered gone.
const KEEPALIVE_MAX: usize = 3;

/// How to prove identity to the remote host.
#[derive(Debug, Clone)]
pub enum Credential {
    Password(Secret),
    KeyFile {
        path: PathBuf,
        passphrase: Option<Secret>,
    },
    /// SSH agent, then the usual key files under ~/.ssh.
    Agent,
}

/// Connection context for one remote host.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    pub credential: Credential,
    /// Accept and remember host keys not yet in known_hosts.
    /// A key that differs from a remembered one is always rejected.
    pub trust_on_first_use: bool,
    /// Optional path to known_hosts file.
    /// If None, uses the default ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Bound on TCP connect plus SSH handshake (default: 10 seconds).
    pub connect_timeout: Duration,
    /// Timeout for command execution (default: 60 seconds).
    pub command_timeout: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            credential: Credential::Agent,
            trust_on_first_use: true,
            known_hosts_path: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn password(mut self, password: Secret) -> Self {
        self.credential = Credential::Password(password);
        self
    }

    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credential = Credential::KeyFile {
            path: path.into(),
            passphrase: None,
        };
        self
    }

    pub fn trust_on_first_use(mut self, tofu: bool) -> Self {
        self.trust_on_first_use = tofu;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// Output from a remote command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code of the command; None when it was killed by a signal.
    pub exit_code: Option<u32>,
    /// Signal that terminated the command, e.g. "KILL".
    pub signal: Option<String>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Accumulates channel messages until the remote command has finished.
#[derive(Debug, Default)]
struct Collector {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_status: Option<u32>,
    signal: Option<String>,
    eof: bool,
}

impl Collector {
    /// Feed one message. Returns true once nothing more is expected.
    fn feed(&mut self, msg: ChannelMsg) -> bool {
        match msg {
            ChannelMsg::Data { data } => self.stdout.extend_from_slice(&data),
            // Extended data type 1 is stderr.
            ChannelMsg::ExtendedData { data, ext: 1 } => self.stderr.extend_from_slice(&data),
            ChannelMsg::ExitStatus { exit_status } => self.exit_status = Some(exit_status),
            ChannelMsg::ExitSignal { signal_name, .. } => {
                self.signal = Some(signal_label(&signal_name));
            }
            ChannelMsg::Eof => self.eof = true,
            ChannelMsg::Close => return true,
            _ => {}
        }
        self.eof && self.finished()
    }

    fn finished(&self) -> bool {
        self.exit_status.is_some() || self.signal.is_some()
    }

    fn finish(self) -> Result<CommandOutput> {
        // Neither status nor signal means the remote side went away mid-command.
        if !self.finished() {
            return Err(Error::ChannelClosed);
        }
        if let Some(signal) = &self.signal {
            tracing::debug!(signal = %signal, "remote command terminated by signal");
        }
        Ok(CommandOutput {
            exit_code: self.exit_status,
            signal: self.signal,
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
        })
    }
}

fn signal_label(signal: &Sig) -> String {
    match signal {
        Sig::Custom(name) => name.clone(),
        other => format!("{other:?}"),
    }
}

/// russh settings for a session whose commands may run up to `command_timeout`.
///
/// Keepalives hold quiet sessions open; the inactivity bound only trips once
/// the command deadline has already passed.
fn russh_config(config: &SessionConfig) -> client::Config {
    client::Config {
        inactivity_timeout: Some(config.command_timeout + KEEPALIVE_INTERVAL * 3),
        keepalive_interval: Some(KEEPALIVE_INTERVAL),
        keepalive_max: KEEPALIVE_MAX,
        ..Default::default()
    }
}

/// An authenticated SSH session to one host.
pub struct Session {
    config: SessionConfig,
    handle: Handle<HostKeyCheck>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Connect, verify the host key, and authenticate.
    ///
    /// The connect timeout covers TCP connect and key exchange only.
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let credential = Prepared::from_credential(&config.credential).await?;

        let russh_config = Arc::new(russh_config(&config));
        let check = HostKeyCheck::new(
            &config.host,
            config.port,
            config.trust_on_first_use,
            config.known_hosts_path.clone(),
        );

        tracing::debug!(host = %config.host, port = config.port, user = %config.user, "connecting");

        let connecting = client::connect(russh_config, (config.host.as_str(), config.port), check);
        let mut handle = tokio::time::timeout(config.connect_timeout, connecting)
            .await
            .map_err(|_| Error::ConnectTimeout {
                host: config.host.clone(),
                port: config.port,
                timeout: config.connect_timeout,
            })?
            .map_err(|e| match e {
                russh::Error::UnknownKey => Error::HostKeyRejected {
                    host: config.host.clone(),
                    port: config.port,
                },
                other => Error::Connection {
                    host: config.host.clone(),
                    port: config.port,
                    reason: other.to_string(),
                },
            })?;

        if !credential.authenticate(&mut handle, &config.user).await? {
            return Err(Error::AuthenticationFailed {
                user: config.user.clone(),
            });
        }
        tracing::debug!(host = %config.host, "authenticated");

        Ok(Self { config, handle })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one command with the session's command timeout.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        self.exec_with_timeout(command, self.config.command_timeout)
            .await
    }

    /// Run one command, giving up after `timeout`.
    ///
    /// On expiry the channel is closed, which makes the server hang up on
    /// the remote process.
    pub async fn exec_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;
        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        let drain = async {
            let mut collector = Collector::default();
            while let Some(msg) = channel.wait().await {
                if collector.feed(msg) {
                    break;
                }
            }
            collector
        };

        match tokio::time::timeout(timeout, drain).await {
            Ok(collector) => collector.finish(),
            Err(_) => {
                if let Err(e) = channel.close().await {
                    tracing::debug!("closing timed out channel: {}", e);
                }
                Err(Error::CommandTimeout(timeout))
            }
        }
    }

    /// Close the connection politely.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}
