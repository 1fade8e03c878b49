//! # peerboot-bootstrap
//!
//! Decision logic for joining the discovery service: validates addresses,
//! rewrites endpoints for the discovery container, decides what to
//! advertise, and assembles a single [`LaunchRequest`] per join.
//!
//! [`LaunchRequest`]: peerboot_common::types::LaunchRequest

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod advertise;
pub mod endpoint;
pub mod launch;
pub mod validator;
