//! `peerboot leave` — Stop and remove the discovery container.

use std::process::ExitCode;

use clap::Args;
use peerboot_runtime::backend::ContainerRuntime;
use peerboot_runtime::backend::docker::DockerCli;
use peerboot_runtime::lifecycle::{LeaveOutcome, Lifecycle};

use super::GlobalArgs;

/// Arguments for the `leave` command.
#[derive(Args, Debug)]
pub struct LeaveArgs {}

/// Executes the `leave` command.
///
/// A missing or stopped container is reported through the exit code
/// (1 and 2 respectively) rather than as an error.
///
/// # Errors
///
/// Returns an error only if the runtime client cannot be found.
pub fn execute(_args: &LeaveArgs, global: &GlobalArgs) -> anyhow::Result<ExitCode> {
    let config = global.config();
    let runtime = DockerCli::locate(&global.docker)?;
    let outcome = leave(&runtime, &config.discovery_container);
    Ok(ExitCode::from(outcome.exit_code()))
}

fn leave(runtime: &dyn ContainerRuntime, name: &str) -> LeaveOutcome {
    tracing::info!(name, "leaving discovery");
    let outcome = Lifecycle::new(runtime).stop(name);
    if outcome != LeaveOutcome::Stopped {
        eprintln!("{name} is not running");
    }
    outcome
}
