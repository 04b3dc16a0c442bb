// ABOUTME: Host configuration for SSH connections.
// ABOUTME: Parses formats like "host", "user@host", "host:port", "user@host:port".

use super::{EnvValue, Timeouts};
use crate::error::Result;
use crate::ssh::{Credential, DEFAULT_PORT, SessionConfig};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Short name used to select the host on the command line.
    #[serde(default)]
    pub name: Option<String>,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<EnvValue>,
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    #[serde(default = "default_trust_first_connection")]
    pub trust_first_connection: bool,
    #[serde(default)]
    pub known_hosts: Option<PathBuf>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_trust_first_connection() -> bool {
    true
}

/// Split `host`, `host:port`, `[v6addr]` or `[v6addr]:port`.
///
/// A bare address with more than one colon is an IPv6 literal without a port.
fn split_host_port(s: &str) -> std::result::Result<(&str, u16), String> {
    let parse_port = |p: &str| {
        p.parse::<u16>()
            .map_err(|_| format!("invalid port: {}", p))
    };

    if let Some(bracketed) = s.strip_prefix('[') {
        let (host, after) = bracketed
            .split_once(']')
            .ok_or_else(|| format!("unterminated '[' in address: {}", s))?;
        return match after {
            "" => Ok((host, DEFAULT_PORT)),
            _ => match after.strip_prefix(':') {
                Some(port) => Ok((host, parse_port(port)?)),
                None => Err(format!("unexpected text after ']': {}", after)),
            },
        };
    }

    match s.split_once(':') {
        Some((host, port)) if !port.contains(':') => Ok((host, parse_port(port)?)),
        _ => Ok((s, DEFAULT_PORT)),
    }
}

impl ServerConfig {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("server address cannot be empty".to_string());
        }

        // Parse format: [user@]host[:port]
        let (user_part, rest) = if let Some(at_pos) = s.find('@') {
            (Some(&s[..at_pos]), &s[at_pos + 1..])
        } else {
            (None, s)
        };

        let (host, port) = split_host_port(rest)?;

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }

        if user_part.is_some_and(str::is_empty) {
            return Err("username cannot be empty".to_string());
        }

        Ok(ServerConfig {
            name: None,
            host: host.to_string(),
            port,
            user: user_part.map(|s| s.to_string()),
            password: None,
            key_path: None,
            trust_first_connection: true,
            known_hosts: None,
        })
    }

    /// Whether `selector` names this host, by name or by address.
    pub fn matches(&self, selector: &str) -> bool {
        self.name.as_deref() == Some(selector) || self.host == selector
    }

    /// Login user: configured, else $USER, else root.
    pub fn login_user(&self) -> String {
        self.user
            .clone()
            .unwrap_or_else(|| std::env::var("USER").unwrap_or_else(|_| "root".to_string()))
    }

    /// Build the SSH connection context for this host.
    ///
    /// A key path wins over a password; with neither, the SSH agent and
    /// default keys are tried.
    pub fn ssh_session_config(&self, timeouts: &Timeouts) -> Result<SessionConfig> {
        let mut config = SessionConfig::new(&self.host, self.login_user())
            .port(self.port)
            .trust_on_first_use(self.trust_first_connection)
            .connect_timeout(timeouts.connect)
            .command_timeout(timeouts.remote_command);

        if let Some(path) = &self.known_hosts {
            config = config.known_hosts_path(path);
        }

        config.credential = match (&self.key_path, &self.password) {
            (Some(path), _) => Credential::KeyFile {
                path: path.clone(),
                passphrase: None,
            },
            (None, Some(password)) => Credential::Password(password.resolve_secret()?),
            (None, None) => Credential::Agent,
        };

        Ok(config)
    }
}
