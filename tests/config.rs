// ABOUTME: Integration tests for configuration parsing and host resolution.
// ABOUTME: Tests YAML parsing, discovery, durations, and SSH context construction.

use opsdeck::config::*;
use opsdeck::error::Error;
use opsdeck::ssh::Credential;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_empty_config_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert!(config.hosts.is_empty());
        assert_eq!(config.timeouts.connect, Duration::from_secs(10));
        assert_eq!(config.timeouts.remote_command, Duration::from_secs(60));
        assert_eq!(config.timeouts.local_command, Duration::from_secs(60));
        assert_eq!(config.retry.attempts, 1);
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
hosts:
  - name: web1
    host: web1.example.com
    port: 2222
    user: deploy
    password:
      env: WEB1_PASSWORD
    trust_first_connection: false
    known_hosts: /tmp/opsdeck_known_hosts
  - name: db
    host: 10.0.0.7
    key_path: /home/ops/.ssh/id_ed25519
  - admin@backup.example.com:2200

timeouts:
  connect: 5s
  remote_command: 2m
  local_command: 90s

retry:
  attempts: 3
  base_delay: 200ms
  max_delay: 2s
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.hosts.len(), 3);
        let web1 = &config.hosts[0];
        assert_eq!(web1.name.as_deref(), Some("web1"));
        assert_eq!(web1.port, 2222);
        assert_eq!(web1.user.as_deref(), Some("deploy"));
        assert!(!web1.trust_first_connection);
        assert_eq!(
            web1.password,
            Some(EnvValue::FromEnv {
                var: "WEB1_PASSWORD".to_string(),
                default: None
            })
        );

        let db = &config.hosts[1];
        assert_eq!(db.port, 22);
        assert!(db.trust_first_connection);

        let backup = &config.hosts[2];
        assert_eq!(backup.host, "backup.example.com");
        assert_eq!(backup.port, 2200);
        assert_eq!(backup.user.as_deref(), Some("admin"));

        assert_eq!(config.timeouts.connect, Duration::from_secs(5));
        assert_eq!(config.timeouts.remote_command, Duration::from_secs(120));
        assert_eq!(config.timeouts.local_command, Duration::from_secs(90));
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_millis(200));
        assert_eq!(config.retry.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn invalid_host_string_is_rejected() {
        let yaml = r#"
hosts:
  - "admin@server:notaport"
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let yaml = r#"
timeouts:
  connect: soon
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }
}

mod resolution {
    use super::*;

    fn config() -> Config {
        Config::from_yaml(
            r#"
hosts:
  - name: web1
    host: web1.example.com
    user: deploy
    password: hunter2
  - name: db
    host: db.example.com
    key_path: /keys/db
    password: ignored
"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_configured_host_by_name() {
        let server = config().resolve_host("web1").unwrap();
        assert_eq!(server.host, "web1.example.com");
    }

    #[test]
    fn resolves_configured_host_by_address() {
        let server = config().resolve_host("db.example.com").unwrap();
        assert_eq!(server.name.as_deref(), Some("db"));
    }

    #[test]
    fn unknown_selector_is_parsed_as_address() {
        let server = config().resolve_host("root@10.1.2.3:2022").unwrap();
        assert_eq!(server.host, "10.1.2.3");
        assert_eq!(server.port, 2022);
        assert_eq!(server.user.as_deref(), Some("root"));
    }

    #[test]
    fn unparsable_selector_is_invalid_config() {
        let err = config().resolve_host("@nohost").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn password_host_gets_password_credential() {
        let config = config();
        let session = config
            .resolve_host("web1")
            .unwrap()
            .ssh_session_config(&config.timeouts)
            .unwrap();

        assert_eq!(session.user, "deploy");
        match &session.credential {
            Credential::Password(secret) => assert_eq!(secret.expose(), "hunter2"),
            other => panic!("expected password credential, got {:?}", other),
        }
    }

    #[test]
    fn key_path_wins_over_password() {
        let config = config();
        let session = config
            .resolve_host("db")
            .unwrap()
            .ssh_session_config(&config.timeouts)
            .unwrap();

        assert!(matches!(session.credential, Credential::KeyFile { .. }));
    }

    #[test]
    fn timeouts_flow_into_session() {
        let mut config = config();
        config.timeouts.connect = Duration::from_secs(3);
        config.timeouts.remote_command = Duration::from_secs(45);

        let session = config
            .resolve_host("web1")
            .unwrap()
            .ssh_session_config(&config.timeouts)
            .unwrap();

        assert_eq!(session.connect_timeout, Duration::from_secs(3));
        assert_eq!(session.command_timeout, Duration::from_secs(45));
    }
}

mod discovery {
    use super::*;

    #[test]
    fn discovers_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "hosts:\n  - web.example.com\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.hosts[0].host, "web.example.com");
    }

    #[test]
    fn discovers_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".opsdeck")).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME_DIR),
            "retry:\n  attempts: 4\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.retry.attempts, 4);
    }

    #[test]
    fn missing_file_is_an_error_for_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::discover(dir.path()),
            Err(Error::ConfigNotFound(_))
        ));
    }

    #[test]
    fn missing_file_yields_defaults_for_discover_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover_or_default(dir.path()).unwrap();
        assert!(config.hosts.is_empty());
        assert_eq!(config.timeouts, Timeouts::default());
    }

    #[test]
    fn broken_file_is_not_masked_by_discover_or_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "hosts: [").unwrap();
        assert!(matches!(
            Config::discover_or_default(dir.path()),
            Err(Error::Yaml(_))
        ));
    }
}
