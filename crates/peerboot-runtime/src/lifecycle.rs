//! Container lifecycle checks that make `join` and `leave` idempotent.
//!
//! Every check re-queries the runtime; no state is cached between calls.
//! This module is the only place that stops or removes containers.

use peerboot_common::error::{PeerbootError, Result};
use peerboot_common::types::{Address, ContainerState};

use crate::backend::ContainerRuntime;

/// What `stop` found before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// A running container was stopped and removed.
    Stopped,
    /// The container did not exist.
    NotPresent,
    /// The container existed but was not running.
    NotRunning,
}

impl LeaveOutcome {
    /// Process exit code reported for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::NotPresent => 1,
            Self::NotRunning => 2,
        }
    }
}

/// Lifecycle operations over named containers.
pub struct Lifecycle<'a> {
    runtime: &'a dyn ContainerRuntime,
}

impl<'a> Lifecycle<'a> {
    /// Wraps a runtime client.
    #[must_use]
    pub fn new(runtime: &'a dyn ContainerRuntime) -> Self {
        Self { runtime }
    }

    /// Current state of `name`, freshly queried.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be queried.
    pub fn state(&self, name: &str) -> Result<ContainerState> {
        self.runtime.inspect(name)
    }

    /// Succeeds only if `name` exists and is running.
    ///
    /// # Errors
    ///
    /// Returns [`PeerbootError::NotPresent`] or [`PeerbootError::NotRunning`],
    /// or a runtime error if the inspection itself fails.
    pub fn check_running(&self, name: &str) -> Result<()> {
        match self.runtime.inspect(name)? {
            ContainerState::Running { .. } => Ok(()),
            ContainerState::Stopped { .. } => Err(PeerbootError::NotRunning { name: name.into() }),
            ContainerState::Absent => Err(PeerbootError::NotPresent { name: name.into() }),
        }
    }

    /// Clears the way for a fresh launch of `expected_image` under `name`.
    ///
    /// A stopped container from the same image family is removed. A running
    /// one, or any container from a different image, is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`PeerbootError::AlreadyRunning`] or
    /// [`PeerbootError::NameCollision`], or a runtime error.
    pub fn check_not_running(&self, name: &str, expected_image: &str) -> Result<()> {
        let state = self.runtime.inspect(name)?;
        let Some(image) = state.image() else {
            return Ok(());
        };
        if !image_matches(image, expected_image) {
            return Err(PeerbootError::NameCollision {
                name: name.into(),
                image: image.into(),
                expected: expected_image.into(),
            });
        }
        if state.is_running() {
            return Err(PeerbootError::AlreadyRunning {
                name: name.into(),
                image: image.into(),
            });
        }
        tracing::debug!(name, image, "removing stale container");
        self.runtime.remove(name)
    }

    /// Best-effort stop followed by forced removal.
    ///
    /// Never fails: inspection, stop and removal errors are logged and
    /// swallowed. The returned outcome reflects what was observed first.
    pub fn stop(&self, name: &str) -> LeaveOutcome {
        let state = self.runtime.inspect(name).unwrap_or_else(|e| {
            tracing::warn!(name, error = %e, "could not inspect container");
            ContainerState::Absent
        });
        let outcome = match state {
            ContainerState::Running { .. } => {
                if let Err(e) = self.runtime.stop(name) {
                    tracing::warn!(name, error = %e, "stop failed");
                }
                LeaveOutcome::Stopped
            }
            ContainerState::Stopped { .. } => LeaveOutcome::NotRunning,
            ContainerState::Absent => LeaveOutcome::NotPresent,
        };
        tracing::debug!(name, ?outcome, "stop finished");
        if let Err(e) = self.runtime.remove(name) {
            tracing::debug!(name, error = %e, "ignoring removal failure");
        }
        outcome
    }

    /// Returns the network address of the running router container.
    ///
    /// # Errors
    ///
    /// Returns [`PeerbootError::NotPresent`] or [`PeerbootError::NotRunning`]
    /// if the router is down, and [`PeerbootError::NoRouterIp`] if it runs
    /// without an assigned address.
    pub fn resolve_router_ip(&self, name: &str) -> Result<Address> {
        match self.runtime.inspect(name)? {
            ContainerState::Running { ip: Some(ip), .. } => Ok(Address::new(ip, None)),
            ContainerState::Running { ip: None, .. } => {
                Err(PeerbootError::NoRouterIp { name: name.into() })
            }
            ContainerState::Stopped { .. } => Err(PeerbootError::NotRunning { name: name.into() }),
            ContainerState::Absent => Err(PeerbootError::NotPresent { name: name.into() }),
        }
    }
}

/// Repository part of an image reference, without tag or digest.
///
/// A `:` inside the registry host (`host:5000/repo`) is not a tag.
#[must_use]
pub fn image_repository(image: &str) -> &str {
    let image = image.split_once('@').map_or(image, |(repo, _)| repo);
    let last_segment = image.rfind('/').map_or(0, |i| i + 1);
    match image[last_segment..].rfind(':') {
        Some(i) => &image[..last_segment + i],
        None => image,
    }
}

/// Whether `actual` is `expected` or the same repository with another tag.
#[must_use]
pub fn image_matches(actual: &str, expected: &str) -> bool {
    actual == expected || image_repository(actual) == image_repository(expected)
}
