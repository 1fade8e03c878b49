//! Host network lookups used when deciding what to advertise.
//!
//! Each lookup is a single blocking query with no retry. The default
//! implementations shell out to `dig` and `ip`; tests substitute fakes.

use std::process::Command;

use peerboot_common::error::{PeerbootError, Result};

/// Finds the IP address this host is reachable at from the outside.
pub trait ExternalIpResolver {
    /// Returns the external IP as text.
    ///
    /// # Errors
    ///
    /// Returns [`PeerbootError::ExternalIpLookupFailed`] if the lookup fails
    /// or yields nothing.
    fn external_ip(&self) -> Result<String>;
}

/// Finds the local source address used for the default route.
pub trait DefaultRouteResolver {
    /// Returns the default route's source IP as text.
    ///
    /// # Errors
    ///
    /// Returns [`PeerbootError::DefaultRouteLookupFailed`] if the routing
    /// table has no usable default route.
    fn default_route_ip(&self) -> Result<String>;
}

/// Resolves the external IP with an OpenDNS `myip` query through `dig`.
#[derive(Debug, Clone)]
pub struct DigResolver {
    binary: String,
}

impl DigResolver {
    /// Creates a resolver using `dig` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: "dig".to_string(),
        }
    }
}

impl Default for DigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExternalIpResolver for DigResolver {
    fn external_ip(&self) -> Result<String> {
        let fail = |reason: String| PeerbootError::ExternalIpLookupFailed { reason };
        let binary = which::which(&self.binary).map_err(|e| fail(format!("{}: {e}", self.binary)))?;
        tracing::debug!(binary = %binary.display(), "querying external IP");
        let output = Command::new(&binary)
            .args(["+short", "myip.opendns.com", "@resolver1.opendns.com"])
            .output()
            .map_err(|e| fail(e.to_string()))?;
        if !output.status.success() {
            return Err(fail(format!("dig exited with {}", output.status)));
        }
        parse_dig_answer(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| fail("empty answer".to_string()))
    }
}

/// Resolves the default-route source address with `ip route get`.
#[derive(Debug, Clone)]
pub struct IpRouteResolver {
    binary: String,
}

impl IpRouteResolver {
    /// Creates a resolver using `ip` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: "ip".to_string(),
        }
    }
}

impl Default for IpRouteResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultRouteResolver for IpRouteResolver {
    fn default_route_ip(&self) -> Result<String> {
        let fail = |reason: String| PeerbootError::DefaultRouteLookupFailed { reason };
        let binary = which::which(&self.binary).map_err(|e| fail(format!("{}: {e}", self.binary)))?;
        // Any routable destination resolves through the default route.
        let output = Command::new(&binary)
            .args(["-4", "route", "get", "1"])
            .output()
            .map_err(|e| fail(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(fail(stderr));
        }
        parse_route_source(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| fail("no source address on default route".to_string()))
    }
}

/// Returns the first non-empty, non-comment line of a `dig +short` answer.
#[must_use]
pub fn parse_dig_answer(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with(';'))
        .map(ToString::to_string)
}

/// Extracts the address following `src` in `ip route get` output.
#[must_use]
pub fn parse_route_source(stdout: &str) -> Option<String> {
    let mut tokens = stdout.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "src" {
            return tokens.next().map(ToString::to_string);
        }
    }
    None
}
