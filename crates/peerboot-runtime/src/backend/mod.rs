//! Container runtime abstraction.

pub mod docker;

use peerboot_common::error::Result;
use peerboot_common::types::{ContainerId, ContainerState, LaunchRequest};

/// The four runtime primitives the bootstrap logic relies on.
///
/// Implementors translate each call into one round trip to the runtime
/// and report its outcome as a typed value.
pub trait ContainerRuntime: Send + Sync {
    /// Reports the current state of the container called `name`.
    ///
    /// A missing container is [`ContainerState::Absent`], not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be queried.
    fn inspect(&self, name: &str) -> Result<ContainerState>;

    /// Launches a detached container and returns the runtime's identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime refuses or fails the launch.
    fn run(&self, request: &LaunchRequest) -> Result<ContainerId>;

    /// Stops a running container.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be stopped.
    fn stop(&self, name: &str) -> Result<()>;

    /// Force-removes a container, running or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be removed.
    fn remove(&self, name: &str) -> Result<()>;
}
