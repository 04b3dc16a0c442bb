// ABOUTME: Catalog commands: list actions and run one by id.
// ABOUTME: Remote actions need a host; local actions run on this machine.

use super::connection::session_config;
use super::exec::report;
use crate::cli::OptionalHostArgs;
use opsdeck::catalog::{self, Group, Params, TargetKind};
use opsdeck::config::Config;
use opsdeck::error::{Error, Result};
use opsdeck::exec::{self, Invocation, Target};
use opsdeck::output::Output;
use std::path::PathBuf;
use std::time::Duration;

/// Print the catalog, optionally limited to one group.
pub fn list_actions(group: Option<&str>) -> Result<()> {
    let actions = match group {
        Some(name) => catalog::actions_in(name.parse::<Group>()?),
        None => catalog::actions(),
    };

    for action in actions {
        let target = match action.target {
            TargetKind::Local => "local",
            TargetKind::Remote => "remote",
        };
        let params = action
            .params
            .iter()
            .map(|p| format!("{p}=…"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<34} {:<7} {:<48} {}", action.id, target, action.title, params);
    }
    Ok(())
}

/// Run one catalog action.
pub async fn run_action(
    config: &Config,
    id: &str,
    pairs: &[String],
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    host: OptionalHostArgs,
    mut output: Output,
) -> Result<()> {
    let action = catalog::find(id)?;
    let params = Params::from_pairs(pairs)?;
    let command = action.build(&params)?;

    let invocation = match action.target {
        TargetKind::Local => Invocation {
            target: Target::Local { working_dir },
            command,
            timeout: timeout.unwrap_or(config.timeouts.local_command),
            retry: config.retry.clone(),
        },
        TargetKind::Remote => {
            let selector = host.host.as_deref().ok_or_else(|| {
                Error::InvalidArgument(format!("action {} needs --host", action.id))
            })?;
            let session = session_config(config, selector, &host.credentials)?;
            output.progress(&format!("  → Connecting to {}...", session.host));
            Invocation::remote(session, command)
                .retry(config.retry.clone())
                .timeout(timeout.unwrap_or(config.timeouts.remote_command))
        }
    };

    output.progress(&format!("  → {}", action.title));
    output.start_timer();
    let result = exec::run(&invocation).await;
    report(&result, &output)
}
