//! Rewrites discovery endpoints into what the discovery container can see.
//!
//! Only `file://` backends need work: the host file is mounted into the
//! container's staging directory and the endpoint is pointed at the
//! mounted copy. Every other scheme passes through untouched.

use std::path::{Path, PathBuf};

use peerboot_common::constants::FILE_STAGING_DIR;
use peerboot_common::error::{PeerbootError, Result};
use peerboot_common::types::{Endpoint, MountSpec};

/// An endpoint ready to hand to the discovery process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedEndpoint {
    /// Endpoint as seen from inside the container.
    pub endpoint: Endpoint,
    /// Mount needed to make the endpoint reachable, if any.
    pub mount: Option<MountSpec>,
}

/// Splits `scheme://path` at the first `://`.
///
/// # Errors
///
/// Returns [`PeerbootError::InvalidEndpoint`] if there is no `://` or the
/// scheme is empty.
pub fn parse_endpoint(raw: &str) -> Result<Endpoint> {
    match raw.split_once("://") {
        Some((scheme, path)) if !scheme.is_empty() => Ok(Endpoint {
            scheme: scheme.to_string(),
            path: path.to_string(),
        }),
        _ => Err(PeerbootError::InvalidEndpoint {
            endpoint: raw.to_string(),
        }),
    }
}

/// Parses and, for `file://`, rewrites an endpoint.
///
/// The file path is always taken as absolute: `file://data/x` and
/// `file:///data/x` both name `/data/x` on the host.
///
/// # Errors
///
/// Returns [`PeerbootError::InvalidEndpoint`] for a malformed URL and
/// [`PeerbootError::FileNotFound`] when a file backend's path is missing.
pub fn transform(raw: &str) -> Result<TransformedEndpoint> {
    let endpoint = parse_endpoint(raw)?;
    if !endpoint.is_file() {
        tracing::debug!(scheme = %endpoint.scheme, "endpoint passed through unchanged");
        return Ok(TransformedEndpoint {
            endpoint,
            mount: None,
        });
    }

    let host_path = host_path(&endpoint.path);
    if !host_path.exists() {
        return Err(PeerbootError::FileNotFound { path: host_path });
    }
    let file_name = host_path
        .file_name()
        .ok_or_else(|| PeerbootError::InvalidEndpoint {
            endpoint: raw.to_string(),
        })?;
    let container_path = Path::new(FILE_STAGING_DIR).join(file_name);
    tracing::info!(
        host = %host_path.display(),
        container = %container_path.display(),
        "mounting file backend"
    );

    Ok(TransformedEndpoint {
        endpoint: Endpoint {
            scheme: endpoint.scheme,
            path: container_path.to_string_lossy().into_owned(),
        },
        mount: Some(MountSpec {
            host_path,
            container_path,
        }),
    })
}

/// Absolute host path for a file endpoint, with runs of `/` collapsed.
fn host_path(path: &str) -> PathBuf {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    PathBuf::from(normalized)
}
