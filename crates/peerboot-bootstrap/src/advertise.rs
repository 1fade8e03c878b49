//! Decides which address the discovery process advertises for the router.

use peerboot_common::error::{PeerbootError, Result};
use peerboot_common::types::{Address, AdvertiseMode};
use peerboot_runtime::host::{DefaultRouteResolver, ExternalIpResolver};

use crate::validator;

/// Where the router was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterLocation {
    /// Router host, without port.
    pub address: Address,
    /// True when the address was given explicitly rather than looked up
    /// from the local router container.
    pub remote: bool,
}

/// Resolves an [`AdvertiseMode`] into a concrete address.
pub struct AdvertiseResolver<'a> {
    external: &'a dyn ExternalIpResolver,
    route: &'a dyn DefaultRouteResolver,
    router_port: u16,
}

impl<'a> AdvertiseResolver<'a> {
    /// Creates a resolver that appends `router_port` to derived addresses.
    #[must_use]
    pub fn new(
        external: &'a dyn ExternalIpResolver,
        route: &'a dyn DefaultRouteResolver,
        router_port: u16,
    ) -> Self {
        Self {
            external,
            route,
            router_port,
        }
    }

    /// Returns the address to advertise, or `None` when nothing is.
    ///
    /// Explicit addresses are used verbatim. External and router-relative
    /// modes append the router's peer port.
    ///
    /// # Errors
    ///
    /// Returns [`PeerbootError::ExternalIpLookupFailed`] or
    /// [`PeerbootError::DefaultRouteLookupFailed`] when a lookup fails, and
    /// [`PeerbootError::InvalidAdvertiseAddress`] when the result is not a
    /// valid `host[:port]`.
    pub fn resolve(&self, mode: &AdvertiseMode, router: &RouterLocation) -> Result<Option<Address>> {
        let candidate = match mode {
            AdvertiseMode::Explicit(addr) => addr.clone(),
            AdvertiseMode::External => {
                let ip = self.external.external_ip()?;
                let ip = ip.trim();
                if ip.is_empty() {
                    return Err(PeerbootError::ExternalIpLookupFailed {
                        reason: "empty answer".into(),
                    });
                }
                format!("{ip}:{}", self.router_port)
            }
            AdvertiseMode::RouterRelative if router.remote => {
                format!("{}:{}", router.address.host, self.router_port)
            }
            AdvertiseMode::RouterRelative => {
                let ip = self.route.default_route_ip()?;
                format!("{}:{}", ip.trim(), self.router_port)
            }
            AdvertiseMode::None => {
                tracing::warn!("no advertise option given; nothing will be advertised");
                return Ok(None);
            }
        };

        let address = validator::parse_address_and_port(&candidate, "advertised").map_err(|_| {
            PeerbootError::InvalidAdvertiseAddress {
                value: candidate.clone(),
            }
        })?;
        tracing::info!(address = %address, "advertising router");
        Ok(Some(address))
    }
}
