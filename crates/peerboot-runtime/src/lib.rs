//! Container lifecycle management and host collaborators for peerboot.
//!
//! The container runtime is reached only through the [`backend::ContainerRuntime`]
//! trait; host network facts through the traits in [`host`]. Both have
//! command-line backed implementations and are replaced by fakes in tests.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod backend;
pub mod host;
pub mod lifecycle;
