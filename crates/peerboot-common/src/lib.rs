//! # peerboot-common
//!
//! Shared types, error definitions, configuration and constants used
//! across the peerboot workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and holds the value types that flow between the
//! bootstrap logic, the container runtime client and the CLI.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
