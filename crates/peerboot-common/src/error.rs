//! Unified error type for the peerboot workspace.
//!
//! Every variant maps onto one [`ErrorKind`], which is what callers use
//! to decide how a failure is reported. All errors are fatal to the
//! invocation that raised them; nothing is retried.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PeerbootError {
    /// A host or host:port string failed validation.
    #[error("invalid {label} address: '{value}'")]
    InvalidAddress {
        /// Which address this was (e.g. "router").
        label: &'static str,
        /// The offending string.
        value: String,
    },

    /// A port string failed validation.
    #[error("invalid {label}: '{value}' is not a port number")]
    InvalidPort {
        /// Which port this was.
        label: &'static str,
        /// The offending string.
        value: String,
    },

    /// The resolved advertisement is not a valid host[:port].
    #[error("invalid advertised address: '{value}'")]
    InvalidAdvertiseAddress {
        /// The resolved advertisement.
        value: String,
    },

    /// An endpoint URL has no `scheme://` prefix.
    #[error("invalid endpoint '{endpoint}': expected scheme://path")]
    InvalidEndpoint {
        /// The offending endpoint.
        endpoint: String,
    },

    /// A `file://` endpoint points at a path that does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Host path that was looked up.
        path: PathBuf,
    },

    /// The container does not exist.
    #[error("{name} container is not present")]
    NotPresent {
        /// Container name.
        name: String,
    },

    /// The container exists but is not running.
    #[error("{name} container is not running")]
    NotRunning {
        /// Container name.
        name: String,
    },

    /// A container with the expected image is already running.
    #[error("{name} container is already running ({image})")]
    AlreadyRunning {
        /// Container name.
        name: String,
        /// Image the running container was created from.
        image: String,
    },

    /// The name is taken by a container from an unrelated image.
    #[error("a container named {name} already exists with image {image} (expected {expected})")]
    NameCollision {
        /// Container name.
        name: String,
        /// Image of the existing container.
        image: String,
        /// Image we expected to find.
        expected: String,
    },

    /// The router container is running but has no assigned address.
    #[error("{name} container has no IP address; is its networking disabled?")]
    NoRouterIp {
        /// Router container name.
        name: String,
    },

    /// The external IP lookup returned nothing usable.
    #[error("could not determine external IP address: {reason}")]
    ExternalIpLookupFailed {
        /// What went wrong.
        reason: String,
    },

    /// The default-route source address could not be determined.
    #[error("could not determine default route address: {reason}")]
    DefaultRouteLookupFailed {
        /// What went wrong.
        reason: String,
    },

    /// The container runtime rejected or failed an operation.
    #[error("container runtime {operation} failed: {message}")]
    Runtime {
        /// Runtime primitive that failed (inspect, run, stop, remove).
        operation: &'static str,
        /// Diagnostic reported by the runtime.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path or program where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Coarse classification of a [`PeerbootError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed address, port or endpoint.
    Validation,
    /// Container already running, absent, or owned by someone else.
    Lifecycle,
    /// External IP or default-route lookup failed.
    ExternalLookup,
    /// The runtime failed to carry out a request.
    Launch,
    /// Local I/O or decoding failure.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Lifecycle => write!(f, "lifecycle"),
            Self::ExternalLookup => write!(f, "external lookup"),
            Self::Launch => write!(f, "launch"),
            Self::Io => write!(f, "io"),
        }
    }
}

impl PeerbootError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress { .. }
            | Self::InvalidPort { .. }
            | Self::InvalidAdvertiseAddress { .. }
            | Self::InvalidEndpoint { .. }
            | Self::FileNotFound { .. } => ErrorKind::Validation,
            Self::NotPresent { .. }
            | Self::NotRunning { .. }
            | Self::AlreadyRunning { .. }
            | Self::NameCollision { .. }
            | Self::NoRouterIp { .. } => ErrorKind::Lifecycle,
            Self::ExternalIpLookupFailed { .. } | Self::DefaultRouteLookupFailed { .. } => {
                ErrorKind::ExternalLookup
            }
            Self::Runtime { .. } => ErrorKind::Launch,
            Self::Io { .. } | Self::Serialization { .. } => ErrorKind::Io,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PeerbootError>;
