//! Domain value types used across the peerboot workspace.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identifier the container runtime assigned to a launched container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Creates a new container ID from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A host with an optional port.
///
/// Instances are only built from strings that already passed validation,
/// so `host` is a hostname or dotted IPv4 address. `Display` reproduces the
/// text the address was parsed from, so `10.0.0.5:06783` stays as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Hostname or IPv4 address.
    pub host: String,
    /// Port, if one was given.
    pub port: Option<u16>,
    text: String,
}

impl Address {
    /// Creates an address from an already validated host and optional port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        let host = host.into();
        let text = match port {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        };
        Self { host, port, text }
    }

    /// Creates an address that renders as `text`, which must be the
    /// validated `host[:port]` string `host` and `port` were taken from.
    #[must_use]
    pub fn parsed(text: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
            text: text.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A discovery backend URL split into scheme and path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Backend scheme, e.g. `etcd`, `consul`, `file`. Never empty.
    pub scheme: String,
    /// Everything after `scheme://`.
    pub path: String,
}

impl Endpoint {
    /// Returns whether this endpoint refers to a local file backend.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.scheme == "file"
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path)
    }
}

/// Host path exposed inside the discovery container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSpec {
    /// Existing path on the host.
    pub host_path: PathBuf,
    /// Where the path appears inside the container.
    pub container_path: PathBuf,
}

impl fmt::Display for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.host_path.display(),
            self.container_path.display()
        )
    }
}

/// Which address, if any, the discovery process advertises for the router.
///
/// Built once by the command dispatcher. When several flags are given the
/// highest-precedence one wins: explicit, then external, then router.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdvertiseMode {
    /// Advertise the given `host[:port]` text verbatim.
    Explicit(String),
    /// Advertise this host's externally visible IP.
    External,
    /// Advertise an address derived from the router's location.
    RouterRelative,
    /// Advertise nothing.
    #[default]
    None,
}

impl AdvertiseMode {
    /// Picks the active mode from the raw join flags.
    #[must_use]
    pub fn from_flags(explicit: Option<String>, external: bool, router: bool) -> Self {
        match (explicit, external, router) {
            (Some(addr), _, _) => Self::Explicit(addr),
            (None, true, _) => Self::External,
            (None, false, true) => Self::RouterRelative,
            (None, false, false) => Self::None,
        }
    }
}

/// Lifecycle state of a named container, as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContainerState {
    /// No container by that name exists.
    Absent,
    /// The container exists but is not running.
    Stopped {
        /// Image the container was created from.
        image: String,
    },
    /// The container is running.
    Running {
        /// Image the container was created from.
        image: String,
        /// Address assigned on the container's network, if any.
        ip: Option<String>,
    },
}

impl ContainerState {
    /// Returns the image of an existing container.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::Stopped { image } | Self::Running { image, .. } => Some(image),
        }
    }

    /// Returns whether the container is running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Stopped { .. } => write!(f, "stopped"),
            Self::Running { .. } => write!(f, "running"),
        }
    }
}

/// Everything needed to launch the discovery container in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Name the container is launched under.
    pub name: String,
    /// Image reference, `repo:tag`.
    pub image: String,
    /// Interface the discovery status endpoint binds to.
    pub status_iface: String,
    /// Port of the discovery status endpoint.
    pub status_port: u16,
    /// Address advertised for the router, if any.
    pub advertise: Option<Address>,
    /// Peer port override applied to discovered peers.
    pub discovered_port: Option<u16>,
    /// Base URL of the router's status endpoint.
    pub router_url: String,
    /// Endpoint as the discovery process will see it.
    pub endpoint: Endpoint,
    /// Host path to expose for `file://` endpoints.
    pub mount: Option<MountSpec>,
    /// Environment overrides for the container.
    pub env: Vec<(String, String)>,
    /// Extra arguments handed to the runtime's run primitive.
    pub runtime_args: Vec<String>,
}

impl LaunchRequest {
    /// Arguments passed to the discovery process itself.
    #[must_use]
    pub fn discovery_args(&self) -> Vec<String> {
        let mut args = vec![
            "-http-iface".to_string(),
            self.status_iface.clone(),
            "-http-port".to_string(),
            self.status_port.to_string(),
        ];
        if let Some(addr) = &self.advertise {
            args.push("-local".to_string());
            args.push(addr.to_string());
        }
        if let Some(port) = self.discovered_port {
            args.push("-discovered-port".to_string());
            args.push(port.to_string());
        }
        args.push("-weave".to_string());
        args.push(self.router_url.clone());
        args.push(self.endpoint.to_string());
        args
    }
}
