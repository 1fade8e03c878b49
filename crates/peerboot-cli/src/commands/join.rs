//! `peerboot join` — Launch the discovery container.

use std::process::ExitCode;

use clap::{ArgAction, Args};
use peerboot_bootstrap::launch::{Bootstrap, JoinOptions};
use peerboot_common::types::AdvertiseMode;
use peerboot_runtime::backend::docker::{DockerCli, run_args};
use peerboot_runtime::host::{DigResolver, IpRouteResolver};

use super::GlobalArgs;
use crate::output;

/// Arguments for the `join` command.
///
/// Flags are only recognised before the first positional token; everything
/// from there on is runtime arguments followed by the endpoint. Advertise
/// flags may be repeated; the first `--advertise` value is the one used.
#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Advertise this address for the router.
    #[arg(long, value_name = "ADDR[:PORT]", action = ArgAction::Append)]
    pub advertise: Vec<String>,

    /// Advertise this host's external IP with the router's peer port.
    #[arg(long, action = ArgAction::Count)]
    pub advertise_external: u8,

    /// Advertise the router's host (or the default route address when the
    /// router is local) with the router's peer port.
    #[arg(long, action = ArgAction::Count)]
    pub advertise_router: u8,

    /// Peer port to use for addresses found through discovery.
    #[arg(long, value_name = "PORT")]
    pub discovered_port: Option<String>,

    /// Address of a remote router instead of the local router container.
    #[arg(long, value_name = "ADDR")]
    pub weave: Option<String>,

    /// Print the runtime command instead of launching.
    #[arg(long)]
    pub dry_run: bool,

    /// Runtime arguments, then the discovery endpoint (scheme://path).
    #[arg(
        value_name = "ARGS... ENDPOINT",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

impl JoinArgs {
    /// Converts the parsed flags into immutable join options.
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint was given.
    pub fn into_options(self) -> anyhow::Result<JoinOptions> {
        let mut args = self.args;
        let endpoint = args
            .pop()
            .ok_or_else(|| anyhow::anyhow!("missing discovery endpoint"))?;
        Ok(JoinOptions {
            advertise: AdvertiseMode::from_flags(
                self.advertise.into_iter().next(),
                self.advertise_external > 0,
                self.advertise_router > 0,
            ),
            discovered_port: self.discovered_port,
            router: self.weave,
            runtime_args: args,
            endpoint,
        })
    }
}

/// Executes the `join` command.
///
/// # Errors
///
/// Returns an error on any validation, lookup, lifecycle or launch failure.
pub fn execute(args: JoinArgs, global: &GlobalArgs) -> anyhow::Result<ExitCode> {
    let dry_run = args.dry_run;
    let options = args.into_options()?;
    let config = global.config();
    let runtime = DockerCli::locate(&global.docker)?;
    let external = DigResolver::new();
    let route = IpRouteResolver::new();
    let bootstrap = Bootstrap::new(&runtime, &external, &route, &config);

    if dry_run {
        let request = bootstrap.plan(options)?;
        println!("{}", output::format_command(&global.docker, &run_args(&request)));
        return Ok(ExitCode::SUCCESS);
    }

    let id = bootstrap
        .join(options)
        .inspect_err(|e| tracing::debug!(kind = %e.kind(), "join failed"))?;
    println!("{id}");
    Ok(ExitCode::SUCCESS)
}
