//! Runtime backend that drives the `docker` command-line client.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, Output};

use peerboot_common::error::{PeerbootError, Result};
use peerboot_common::types::{ContainerId, ContainerState, LaunchRequest};
use serde::Deserialize;

use super::ContainerRuntime;

/// Backend that shells out to a Docker-compatible client binary.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
}

impl DockerCli {
    /// Locates `binary` on `PATH` (or accepts it as a path).
    ///
    /// # Errors
    ///
    /// Returns an error if the client binary cannot be found.
    pub fn locate(binary: &str) -> Result<Self> {
        let path = which::which(binary).map_err(|e| PeerbootError::Runtime {
            operation: "locate",
            message: format!("{binary}: {e}"),
        })?;
        tracing::debug!(binary = %path.display(), "using container runtime client");
        Ok(Self { binary: path })
    }

    fn exec(&self, operation: &'static str, args: &[String]) -> Result<Output> {
        tracing::debug!(operation, ?args, "invoking container runtime");
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| PeerbootError::Io {
                path: self.binary.clone(),
                source: e,
            })
    }
}

impl ContainerRuntime for DockerCli {
    fn inspect(&self, name: &str) -> Result<ContainerState> {
        let args = vec![
            "inspect".to_string(),
            "--type".to_string(),
            "container".to_string(),
            name.to_string(),
        ];
        let output = self.exec("inspect", &args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No such") {
                return Ok(ContainerState::Absent);
            }
            return Err(runtime_failure("inspect", &output));
        }
        parse_inspect(&String::from_utf8_lossy(&output.stdout))
    }

    fn run(&self, request: &LaunchRequest) -> Result<ContainerId> {
        let output = self.exec("run", &run_args(request))?;
        if !output.status.success() {
            return Err(runtime_failure("run", &output));
        }
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(PeerbootError::Runtime {
                operation: "run",
                message: "runtime returned no container id".into(),
            });
        }
        tracing::info!(id = %id, name = %request.name, "discovery container launched");
        Ok(ContainerId::new(id))
    }

    fn stop(&self, name: &str) -> Result<()> {
        let output = self.exec("stop", &["stop".to_string(), name.to_string()])?;
        if !output.status.success() {
            return Err(runtime_failure("stop", &output));
        }
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let args = ["rm".to_string(), "-f".to_string(), name.to_string()];
        let output = self.exec("remove", &args)?;
        if !output.status.success() {
            return Err(runtime_failure("remove", &output));
        }
        Ok(())
    }
}

fn runtime_failure(operation: &'static str, output: &Output) -> PeerbootError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    };
    PeerbootError::Runtime { operation, message }
}

/// Builds the full argument vector for a detached `run`.
#[must_use]
pub fn run_args(request: &LaunchRequest) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        request.name.clone(),
    ];
    for (key, value) in &request.env {
        args.push("-e".to_string());
        args.push(format!("{key}={value}"));
    }
    if let Some(mount) = &request.mount {
        args.push("-v".to_string());
        args.push(mount.to_string());
    }
    args.extend(request.runtime_args.iter().cloned());
    args.push(request.image.clone());
    args.extend(request.discovery_args());
    args
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectEntry {
    state: InspectState,
    config: InspectConfig,
    #[serde(default)]
    network_settings: Option<InspectNetwork>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectState {
    running: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectConfig {
    image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectNetwork {
    #[serde(rename = "IPAddress", default)]
    ip_address: Option<String>,
    #[serde(default)]
    networks: Option<BTreeMap<String, InspectAttachment>>,
}

#[derive(Debug, Deserialize)]
struct InspectAttachment {
    #[serde(rename = "IPAddress", default)]
    ip_address: Option<String>,
}

impl InspectNetwork {
    /// Legacy top-level address first, then the first attached network.
    fn ip(&self) -> Option<String> {
        let attached = self
            .networks
            .iter()
            .flat_map(BTreeMap::values)
            .filter_map(|n| n.ip_address.as_deref());
        self.ip_address
            .as_deref()
            .into_iter()
            .chain(attached)
            .find(|ip| !ip.is_empty())
            .map(ToString::to_string)
    }
}

/// Decodes `inspect` JSON output into a [`ContainerState`].
///
/// # Errors
///
/// Returns an error if the output is not the expected JSON shape.
pub fn parse_inspect(stdout: &str) -> Result<ContainerState> {
    let entries: Vec<InspectEntry> = serde_json::from_str(stdout)?;
    let Some(entry) = entries.into_iter().next() else {
        return Ok(ContainerState::Absent);
    };
    let image = entry.config.image;
    if entry.state.running {
        let ip = entry.network_settings.as_ref().and_then(InspectNetwork::ip);
        Ok(ContainerState::Running { image, ip })
    } else {
        Ok(ContainerState::Stopped { image })
    }
}
