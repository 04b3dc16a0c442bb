// ABOUTME: Library root for opsdeck - command execution on local and remote hosts.
// ABOUTME: The opsdeck binary in main.rs is a thin CLI over these modules.

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod exec;
pub mod local;
pub mod output;
pub mod retry;
pub mod secret;
pub mod ssh;
