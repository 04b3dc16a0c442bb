// ABOUTME: Config scaffolding for new setups.
// ABOUTME: Creates an opsdeck.yml template file.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

const TEMPLATE: &str = r#"# Hosts reachable over SSH. Entries may be "user@host:port" strings
# or maps with a name, credentials and host key settings.
hosts:
  - name: web1
    host: server.example.com
    port: 22
    user: admin
    # Read the password from the environment instead of this file.
    password:
      env: OPSDECK_WEB1_PASSWORD
    # key_path: ~/.ssh/id_ed25519
    # Accept and remember unknown host keys (changed keys are always rejected).
    # trust_first_connection: true

timeouts:
  connect: 10s
  remote_command: 60s
  local_command: 60s

# Retry transient connection failures (never authentication failures).
retry:
  attempts: 1
  base_delay: 500ms
"#;

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;
    tracing::info!("wrote {}", config_path.display());

    Ok(())
}
