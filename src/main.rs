// ABOUTME: Entry point for the opsdeck CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use opsdeck::config::{self, Config};
use opsdeck::error::{Error, Result};
use opsdeck::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    match run(cli.command, output).await {
        Ok(()) => {}
        // The result has already been printed.
        Err(Error::CommandFailed) => std::process::exit(1),
        Err(e) => {
            Output::new(mode).error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match command {
        Commands::Init { force } => {
            config::init_config(&cwd, force)?;
            output.progress(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Local { cwd: dir, exec } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::local(&config, dir, exec, output).await
        }
        Commands::Remote { host, exec } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::remote(&config, host, exec, output).await
        }
        Commands::Actions { group } => commands::list_actions(group.as_deref()),
        Commands::Run {
            action,
            params,
            cwd: dir,
            timeout,
            host,
        } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::run_action(&config, &action, &params, dir, timeout, host, output).await
        }
    }
}
