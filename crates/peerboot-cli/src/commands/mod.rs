//! CLI command definitions and dispatch.

pub mod join;
pub mod leave;
pub mod status;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use peerboot_common::config::BootstrapConfig;
use peerboot_common::constants::{
    DEFAULT_DISCOVERY_CONTAINER, DEFAULT_IMAGE_REPO, DEFAULT_IMAGE_VERSION,
    DEFAULT_ROUTER_CONTAINER, DEFAULT_RUNTIME_BINARY,
};

/// peerboot — join or leave the overlay's peer-discovery service.
#[derive(Parser, Debug)]
#[command(name = "peerboot", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Configuration options, each with an environment fallback.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Repository of the discovery image.
    #[arg(long, global = true, env = "DISCOVERY_IMAGE_REPO", default_value = DEFAULT_IMAGE_REPO)]
    pub image_repo: String,

    /// Tag of the discovery image.
    #[arg(long, global = true, env = "DISCOVERY_IMAGE_VERSION", default_value = DEFAULT_IMAGE_VERSION)]
    pub image_version: String,

    /// Name of the discovery container.
    #[arg(long, global = true, env = "DISCOVERY_CONTAINER_NAME", default_value = DEFAULT_DISCOVERY_CONTAINER)]
    pub discovery_name: String,

    /// Name of the overlay router container.
    #[arg(long, global = true, env = "WEAVE_CONTAINER_NAME", default_value = DEFAULT_ROUTER_CONTAINER)]
    pub router_name: String,

    /// Extra runtime arguments for every discovery launch (whitespace separated).
    #[arg(long, global = true, env = "DISCOVERY_DOCKER_ARGS", default_value = "", allow_hyphen_values = true)]
    pub discovery_docker_args: String,

    /// Container runtime client binary.
    #[arg(long, global = true, env = "DOCKER_CLIENT", default_value = DEFAULT_RUNTIME_BINARY)]
    pub docker: String,

    /// Log output format.
    #[arg(long, global = true, env = "PEERBOOT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl GlobalArgs {
    /// Builds the invocation-wide configuration.
    #[must_use]
    pub fn config(&self) -> BootstrapConfig {
        BootstrapConfig {
            image_repo: self.image_repo.clone(),
            image_version: self.image_version.clone(),
            discovery_container: self.discovery_name.clone(),
            router_container: self.router_name.clone(),
            extra_runtime_args: self
                .discovery_docker_args
                .split_whitespace()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the discovery container for an endpoint.
    Join(join::JoinArgs),
    /// Stop and remove the discovery container.
    Leave(leave::LeaveArgs),
    /// Show discovery and router container state.
    Status(status::StatusArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command fails fatally.
pub fn execute(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Join(args) => join::execute(args, &cli.global),
        Command::Leave(args) => leave::execute(&args, &cli.global),
        Command::Status(args) => status::execute(&args, &cli.global),
    }
}
