// ABOUTME: Command module aggregator for the opsdeck CLI.
// ABOUTME: Re-exports the exec and action command handlers.

mod actions;
mod connection;
mod exec;

pub use actions::{list_actions, run_action};
pub use exec::{local, remote};
