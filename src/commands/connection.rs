// ABOUTME: Resolves CLI host and credential flags against opsdeck.yml.
// ABOUTME: Produces the SSH connection context handed to the remote executor.

use crate::cli::CredentialArgs;
use opsdeck::config::{Config, EnvValue};
use opsdeck::error::Result;
use opsdeck::ssh::SessionConfig;

/// Password variable consulted when neither flags nor config name a credential.
pub const DEFAULT_PASSWORD_ENV: &str = "OPSDECK_PASSWORD";

/// Build the connection context for `selector`, with flags overriding config.
pub fn session_config(
    config: &Config,
    selector: &str,
    credentials: &CredentialArgs,
) -> Result<SessionConfig> {
    let mut server = config.resolve_host(selector)?;

    if let Some(user) = &credentials.user {
        server.user = Some(user.clone());
    }

    if let Some(key) = &credentials.key {
        server.key_path = Some(key.clone());
    }

    if let Some(var) = &credentials.password_env {
        server.key_path = None;
        server.password = Some(EnvValue::FromEnv {
            var: var.clone(),
            default: None,
        });
    } else if server.password.is_none()
        && server.key_path.is_none()
        && std::env::var_os(DEFAULT_PASSWORD_ENV).is_some()
    {
        server.password = Some(EnvValue::FromEnv {
            var: DEFAULT_PASSWORD_ENV.to_string(),
            default: None,
        });
    }

    server.ssh_session_config(&config.timeouts)
}
