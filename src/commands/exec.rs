// ABOUTME: Ad-hoc local and remote command execution.
// ABOUTME: Builds an invocation from CLI arguments and prints the result.

use super::connection::session_config;
use crate::cli::{ExecArgs, HostArgs};
use opsdeck::command::CommandLine;
use opsdeck::config::Config;
use opsdeck::error::{Error, Result};
use opsdeck::exec::{self, CommandResult, Invocation, Target};
use opsdeck::output::Output;
use std::path::PathBuf;

fn command_line(args: &ExecArgs) -> Result<CommandLine> {
    if args.shell {
        return Ok(CommandLine::shell(args.command.join(" ")));
    }
    CommandLine::from_words(&args.command)
        .ok_or_else(|| Error::InvalidArgument("no command given".to_string()))
}

/// Print the result and turn a failed command into an exit status.
pub(super) fn report(result: &CommandResult, output: &Output) -> Result<()> {
    output.result(result);
    if result.succeeded() {
        Ok(())
    } else {
        Err(Error::CommandFailed)
    }
}

/// Run a command on this machine.
pub async fn local(
    config: &Config,
    working_dir: Option<PathBuf>,
    args: ExecArgs,
    mut output: Output,
) -> Result<()> {
    let command = command_line(&args)?;
    let invocation = Invocation {
        target: Target::Local { working_dir },
        command,
        timeout: args.timeout.unwrap_or(config.timeouts.local_command),
        retry: config.retry.clone(),
    };

    output.start_timer();
    let result = exec::run(&invocation).await;
    report(&result, &output)
}

/// Run a command on a remote host.
pub async fn remote(
    config: &Config,
    host: HostArgs,
    args: ExecArgs,
    mut output: Output,
) -> Result<()> {
    let command = command_line(&args)?;
    let session = session_config(config, &host.host, &host.credentials)?;

    output.progress(&format!("  → Connecting to {}...", session.host));

    let invocation = Invocation::remote(session, command)
        .retry(config.retry.clone())
        .timeout(args.timeout.unwrap_or(config.timeouts.remote_command));

    output.start_timer();
    let result = exec::run(&invocation).await;
    report(&result, &output)
}
