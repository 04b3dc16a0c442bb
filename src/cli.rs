// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "opsdeck")]
#[command(about = "Run administrative commands locally or over SSH")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only command output
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an opsdeck.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a command on this machine
    Local {
        /// Working directory for the command
        #[arg(long)]
        cwd: Option<PathBuf>,

        #[command(flatten)]
        exec: ExecArgs,
    },

    /// Run a command on a remote host over SSH
    Remote {
        #[command(flatten)]
        host: HostArgs,

        #[command(flatten)]
        exec: ExecArgs,
    },

    /// List available actions
    Actions {
        /// Only list actions in this group (linux, docker, kubernetes, windows)
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Run a catalog action
    Run {
        /// Action id, e.g. linux.disk-usage
        action: String,

        /// Action parameter as key=value (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Working directory for local actions
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Execution timeout, e.g. 30s
        #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
        timeout: Option<Duration>,

        #[command(flatten)]
        host: OptionalHostArgs,
    },
}

#[derive(Args)]
pub struct ExecArgs {
    /// Execution timeout, e.g. 30s
    #[arg(long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Pass the command to the shell as one string (enables pipes and redirection)
    #[arg(long)]
    pub shell: bool,

    /// Command and arguments
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Args)]
pub struct HostArgs {
    /// Configured host name or [user@]host[:port]
    #[arg(long = "host", short = 'H')]
    pub host: String,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

#[derive(Args)]
pub struct OptionalHostArgs {
    /// Configured host name or [user@]host[:port] (remote actions)
    #[arg(long = "host", short = 'H')]
    pub host: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

#[derive(Args, Clone)]
pub struct CredentialArgs {
    /// Login user (overrides config)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Environment variable holding the SSH password
    #[arg(long, value_name = "VAR")]
    pub password_env: Option<String>,

    /// Private key file
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,
}
