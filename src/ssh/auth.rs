// ABOUTME: Turns a Credential into an SSH user authentication exchange.
// ABOUTME: Key material is loaded before connecting so bad paths fail fast.

use super::client::Credential;
use super::error::{Error, Result};
use super::host_key::HostKeyCheck;
use crate::secret::Secret;
use russh::client::Handle;
use russh::keys::agent::client::AgentClient;
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key::PrivateKey};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::UnixStream;

/// Key files tried, in order, when no agent is reachable.
const DEFAULT_KEY_FILES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

/// Credential material ready for the auth exchange.
pub(crate) enum Prepared<'a> {
    Password(&'a Secret),
    Agent(AgentClient<UnixStream>),
    Key(Arc<PrivateKey>),
}

impl<'a> Prepared<'a> {
    pub(crate) async fn from_credential(credential: &'a Credential) -> Result<Self> {
        match credential {
            Credential::Password(password) => Ok(Prepared::Password(password)),
            Credential::KeyFile { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(Secret::expose))
                    .map_err(|e| Error::KeyLoadFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    })?;
                Ok(Prepared::Key(Arc::new(key)))
            }
            Credential::Agent => match AgentClient::connect_env().await {
                Ok(agent) => Ok(Prepared::Agent(agent)),
                Err(e) => {
                    tracing::debug!("no SSH agent: {}", e);
                    default_key().map(Prepared::Key)
                }
            },
        }
    }

    /// Run the exchange. `Ok(false)` means the server refused every attempt.
    pub(crate) async fn authenticate(
        self,
        handle: &mut Handle<HostKeyCheck>,
        user: &str,
    ) -> Result<bool> {
        match self {
            Prepared::Password(password) => Ok(handle
                .authenticate_password(user, password.expose())
                .await?
                .success()),
            Prepared::Key(key) => {
                let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
                Ok(handle
                    .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash_alg))
                    .await?
                    .success())
            }
            Prepared::Agent(mut agent) => {
                let identities = agent.request_identities().await.map_err(|e| {
                    Error::AgentUnavailable(format!("failed to list agent keys: {}", e))
                })?;
                if identities.is_empty() {
                    return Err(Error::AgentUnavailable("no keys in SSH agent".to_string()));
                }

                for identity in identities {
                    let accepted = handle
                        .authenticate_publickey_with(user, identity, None, &mut agent)
                        .await
                        .map(|r| r.success())
                        .unwrap_or(false);
                    if accepted {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

fn default_key() -> Result<Arc<PrivateKey>> {
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        Error::AgentUnavailable("SSH agent not available and HOME not set".to_string())
    })?;
    let ssh_dir = home.join(".ssh");

    DEFAULT_KEY_FILES
        .iter()
        .find_map(|name| load_secret_key(ssh_dir.join(name), None).ok())
        .map(Arc::new)
        .ok_or_else(|| {
            Error::AgentUnavailable("SSH agent not available and no default keys found".to_string())
        })
}
