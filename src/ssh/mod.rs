// ABOUTME: SSH client module for remote command execution.
// ABOUTME: Supports password, key file and agent authentication with known_hosts verification.

mod auth;
mod client;
mod error;
mod host_key;

pub use client::{
    CommandOutput, Credential, DEFAULT_COMMAND_TIMEOUT, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT,
    Session, SessionConfig,
};
pub use error::{Error, Result};
