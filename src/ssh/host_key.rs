// ABOUTME: Host key verification against known_hosts with optional first-use trust.
// ABOUTME: A key that differs from the recorded one is always refused.

use russh::client;
use russh::keys::known_hosts;
use russh::keys::ssh_key::PublicKey;
use std::path::PathBuf;

/// What to do with the key a server presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Known,
    /// Unknown key accepted under first-use trust; record it.
    Learn,
    Reject,
}

impl Verdict {
    /// Decide from a known_hosts lookup.
    ///
    /// `Ok(false)` means the host has no entry. An unreadable known_hosts
    /// file counts as "no entry".
    pub(crate) fn decide(
        lookup: &Result<bool, russh::keys::Error>,
        trust_on_first_use: bool,
    ) -> Self {
        match lookup {
            Ok(true) => Verdict::Known,
            Err(russh::keys::Error::KeyChanged { .. }) => Verdict::Reject,
            Ok(false) | Err(_) if trust_on_first_use => Verdict::Learn,
            Ok(false) | Err(_) => Verdict::Reject,
        }
    }
}

/// russh callback that applies the known_hosts policy for one host.
pub(crate) struct HostKeyCheck {
    host: String,
    port: u16,
    trust_on_first_use: bool,
    known_hosts: Option<PathBuf>,
}

impl HostKeyCheck {
    pub(crate) fn new(
        host: &str,
        port: u16,
        trust_on_first_use: bool,
        known_hosts: Option<PathBuf>,
    ) -> Self {
        Self {
            host: host.to_string(),
            port,
            trust_on_first_use,
            known_hosts,
        }
    }

    fn lookup(&self, key: &PublicKey) -> Result<bool, russh::keys::Error> {
        match &self.known_hosts {
            Some(path) => known_hosts::check_known_hosts_path(&self.host, self.port, key, path),
            None => known_hosts::check_known_hosts(&self.host, self.port, key),
        }
    }

    fn remember(&self, key: &PublicKey) -> Result<(), russh::keys::Error> {
        match &self.known_hosts {
            Some(path) => known_hosts::learn_known_hosts_path(&self.host, self.port, key, path),
            None => known_hosts::learn_known_hosts(&self.host, self.port, key),
        }
    }
}

impl client::Handler for HostKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> Result<bool, Self::Error> {
        let lookup = self.lookup(key);
        match Verdict::decide(&lookup, self.trust_on_first_use) {
            Verdict::Known => Ok(true),
            Verdict::Learn => {
                tracing::warn!(host = %self.host, port = self.port, "accepting unknown host key on first use");
                if let Err(e) = self.remember(key) {
                    tracing::warn!(host = %self.host, "could not record host key: {}", e);
                }
                Ok(true)
            }
            Verdict::Reject => {
                match lookup {
                    Err(russh::keys::Error::KeyChanged { line }) => tracing::error!(
                        host = %self.host,
                        port = self.port,
                        line,
                        "host key does not match known_hosts"
                    ),
                    _ => tracing::warn!(host = %self.host, port = self.port, "unknown host key refused"),
                }
                Ok(false)
            }
        }
    }
}
