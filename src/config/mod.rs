// ABOUTME: Configuration types and parsing for opsdeck.yml.
// ABOUTME: Holds known hosts, execution timeouts, and the connect retry policy.

mod env_value;
mod init;
mod server;

pub use env_value::EnvValue;
pub use init::init_config;
pub use server::ServerConfig;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::ssh::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "opsdeck.yml";
pub const CONFIG_FILENAME_ALT: &str = "opsdeck.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".opsdeck/config.yml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_hosts")]
    pub hosts: Vec<ServerConfig>,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Timeouts {
    #[serde(default = "default_connect", with = "humantime_serde")]
    pub connect: Duration,
    #[serde(default = "default_remote_command", with = "humantime_serde")]
    pub remote_command: Duration,
    #[serde(default = "default_local_command", with = "humantime_serde")]
    pub local_command: Duration,
}

fn default_connect() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_remote_command() -> Duration {
    DEFAULT_COMMAND_TIMEOUT
}

fn default_local_command() -> Duration {
    crate::local::DEFAULT_TIMEOUT
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: default_connect(),
            remote_command: default_remote_command(),
            local_command: default_local_command(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but an absent file yields the defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn find_host(&self, selector: &str) -> Option<&ServerConfig> {
        self.hosts.iter().find(|h| h.matches(selector))
    }

    /// Look `selector` up among configured hosts, else parse it as
    /// `[user@]host[:port]`.
    pub fn resolve_host(&self, selector: &str) -> Result<ServerConfig> {
        if let Some(host) = self.find_host(selector) {
            return Ok(host.clone());
        }
        ServerConfig::parse(selector).map_err(Error::InvalidConfig)
    }
}

fn deserialize_hosts<'de, D>(deserializer: D) -> std::result::Result<Vec<ServerConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<ServerEntry> = Vec::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|entry| entry.into_server_config())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerEntry {
    Simple(String),
    Detailed(ServerConfig),
}

impl ServerEntry {
    fn into_server_config(self) -> std::result::Result<ServerConfig, String> {
        match self {
            ServerEntry::Simple(s) => ServerConfig::parse(&s),
            ServerEntry::Detailed(c) => Ok(c),
        }
    }
}
