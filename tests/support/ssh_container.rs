// ABOUTME: SSH container helper for integration tests.
// ABOUTME: Uses bollard to run a shared OpenSSH server with password login.

use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, RemoveContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use futures::StreamExt;
use opsdeck::secret::Secret;
use opsdeck::ssh::SessionConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

const IMAGE: &str = "lscr.io/linuxserver/openssh-server:latest";
const SSH_PORT: u16 = 2222;
pub const TEST_USER: &str = "testuser";
pub const TEST_PASSWORD: &str = "opsdeck-test-password";

/// Id of the started container, removed when the test process exits.
static CONTAINER_ID: OnceLock<String> = OnceLock::new();

#[ctor::dtor]
fn remove_container_on_exit() {
    let Some(id) = CONTAINER_ID.get() else {
        return;
    };
    let Ok(docker) = Docker::connect_with_local_defaults() else {
        return;
    };
    if let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        rt.block_on(remove(&docker, id));
    }
}

async fn remove(docker: &Docker, id: &str) {
    let _ = docker
        .stop_container(id, None::<StopContainerOptions>)
        .await;
    let options = RemoveContainerOptions {
        force: true,
        ..Default::default()
    };
    let _ = docker.remove_container(id, Some(options)).await;
}

/// Shared SSH container for all tests; None when no Docker daemon answers.
static SHARED_CONTAINER: tokio::sync::OnceCell<Option<SshContainer>> =
    tokio::sync::OnceCell::const_new();

/// Get the shared SSH container, starting it if needed.
pub async fn shared_container() -> Option<&'static SshContainer> {
    SHARED_CONTAINER
        .get_or_init(|| async {
            match SshContainer::start().await {
                Ok(container) => Some(container),
                Err(e) => {
                    eprintln!("SSH container unavailable: {e}");
                    None
                }
            }
        })
        .await
        .as_ref()
}

/// Skip the test when Docker is not available.
#[macro_export]
macro_rules! require_ssh_container {
    () => {
        match support::ssh_container::shared_container().await {
            Some(container) => container,
            None => {
                eprintln!("Skipping test: no Docker daemon for the SSH container");
                return;
            }
        }
    };
}

/// Running SSH container with connection details.
pub struct SshContainer {
    port: u16,
}

impl SshContainer {
    async fn start() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;

        // Pull image if needed
        let mut pull_stream = docker.create_image(
            Some(CreateImageOptions {
                from_image: Some(IMAGE.to_string()),
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(result) = pull_stream.next().await {
            result?;
        }

        let port = super::closed_port().await;
        let name = format!("opsdeck-ssh-test-{}", std::process::id());
        let options = CreateContainerOptions {
            name: Some(name),
            ..Default::default()
        };
        let container = docker
            .create_container(Some(options), container_body(port))
            .await?;
        let _ = CONTAINER_ID.set(container.id.clone());

        docker
            .start_container(&container.id, None::<StartContainerOptions>)
            .await?;

        Self::wait_for_ssh(port).await?;

        Ok(Self { port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// SessionConfig with the container's password and a private known_hosts.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new("127.0.0.1", TEST_USER)
            .port(self.port)
            .password(Secret::new(TEST_PASSWORD))
            .trust_on_first_use(true)
            .known_hosts_path(Self::known_hosts_path())
    }

    fn known_hosts_path() -> PathBuf {
        std::env::temp_dir().join(format!("opsdeck-known-hosts-{}", std::process::id()))
    }

    async fn wait_for_ssh(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        use tokio::io::AsyncReadExt;

        let addr = format!("127.0.0.1:{}", port);
        for _ in 0..60 {
            if let Ok(mut stream) = tokio::net::TcpStream::connect(&addr).await {
                // Read the banner to be sure sshd is answering
                let mut buf = [0u8; 32];
                if let Ok(Ok(n)) =
                    tokio::time::timeout(std::time::Duration::from_secs(2), stream.read(&mut buf))
                        .await
                {
                    if n > 0 && String::from_utf8_lossy(&buf[..n]).starts_with("SSH-") {
                        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                        return Ok(());
                    }
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }
        Err("SSH container did not become ready in time".into())
    }
}

/// Password-login OpenSSH server with its port published on loopback.
fn container_body(host_port: u16) -> ContainerCreateBody {
    let env = vec![
        "PUID=1000".to_string(),
        "PGID=1000".to_string(),
        "PASSWORD_ACCESS=true".to_string(),
        format!("USER_NAME={TEST_USER}"),
        format!("USER_PASSWORD={TEST_PASSWORD}"),
    ];
    let binding = PortBinding {
        host_ip: Some("127.0.0.1".to_string()),
        host_port: Some(host_port.to_string()),
    };
    let port_bindings = HashMap::from([(format!("{SSH_PORT}/tcp"), Some(vec![binding]))]);

    ContainerCreateBody {
        image: Some(IMAGE.to_string()),
        env: Some(env),
        host_config: Some(HostConfig {
            port_bindings: Some(port_bindings),
            ..Default::default()
        }),
        ..Default::default()
    }
}
