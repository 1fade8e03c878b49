//! `peerboot status` — Show discovery and router container state.

use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use peerboot_common::constants::ROUTER_STATUS_PORT;
use peerboot_common::types::ContainerState;
use peerboot_runtime::backend::docker::DockerCli;
use peerboot_runtime::lifecycle::Lifecycle;
use serde::Serialize;

use super::GlobalArgs;
use crate::output;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// State of one named container.
#[derive(Debug, Serialize)]
struct ContainerReport {
    name: String,
    state: ContainerState,
}

/// Combined view printed by `status`.
#[derive(Debug, Serialize)]
struct StatusReport {
    discovery: ContainerReport,
    router: ContainerReport,
    /// Whether the router's status endpoint answered; absent when the
    /// router has no address to probe.
    router_reachable: Option<bool>,
}

/// Executes the `status` command.
///
/// # Errors
///
/// Returns an error if the runtime cannot be queried.
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> anyhow::Result<ExitCode> {
    let config = global.config();
    let runtime = DockerCli::locate(&global.docker)?;
    let lifecycle = Lifecycle::new(&runtime);

    let discovery = lifecycle.state(&config.discovery_container)?;
    let router = lifecycle.state(&config.router_container)?;
    let router_reachable = match &router {
        ContainerState::Running { ip: Some(ip), .. } => Some(probe_router(ip)),
        _ => None,
    };

    let report = StatusReport {
        discovery: ContainerReport {
            name: config.discovery_container,
            state: discovery,
        },
        router: ContainerReport {
            name: config.router_container,
            state: router,
        },
        router_reachable,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", output::status_header());
    for entry in [&report.discovery, &report.router] {
        println!("{}", output::status_row(&entry.name, &entry.state));
    }
    if let Some(reachable) = report.router_reachable {
        let verdict = if reachable { "reachable" } else { "unreachable" };
        println!();
        println!("router status endpoint: {verdict}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Single GET against the router's status endpoint; no retry.
fn probe_router(ip: &str) -> bool {
    let url = format!("http://{ip}:{ROUTER_STATUS_PORT}/status");
    let client = match reqwest::blocking::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "could not build HTTP client");
            return false;
        }
    };
    match client.get(&url).send() {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "router status probe failed");
            false
        }
    }
}
