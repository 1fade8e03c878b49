//! Join and leave orchestration.
//!
//! A join resolves the router, decides the advertisement, rewrites the
//! endpoint, then submits one launch request. Any failure aborts the join
//! before the runtime is asked to launch anything.

use peerboot_common::config::BootstrapConfig;
use peerboot_common::constants::{
    DISCOVERY_STATUS_IFACE, DISCOVERY_STATUS_PORT, OVERLAY_OPT_OUT_ENV, ROUTER_PEER_PORT,
    ROUTER_STATUS_PORT,
};
use peerboot_common::error::Result;
use peerboot_common::types::{AdvertiseMode, ContainerId, LaunchRequest};
use peerboot_runtime::backend::ContainerRuntime;
use peerboot_runtime::host::{DefaultRouteResolver, ExternalIpResolver};
use peerboot_runtime::lifecycle::{LeaveOutcome, Lifecycle};

use crate::advertise::{AdvertiseResolver, RouterLocation};
use crate::endpoint;
use crate::validator;

/// Parsed `join` flags, built once by the command dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOptions {
    /// What to advertise.
    pub advertise: AdvertiseMode,
    /// Raw `--discovered-port` value.
    pub discovered_port: Option<String>,
    /// Raw `--weave` value; when absent the local router container is used.
    pub router: Option<String>,
    /// Arguments passed through to the runtime's run primitive.
    pub runtime_args: Vec<String>,
    /// Raw discovery endpoint URL.
    pub endpoint: String,
}

/// Wires the bootstrap steps to their collaborators.
pub struct Bootstrap<'a> {
    runtime: &'a dyn ContainerRuntime,
    external: &'a dyn ExternalIpResolver,
    route: &'a dyn DefaultRouteResolver,
    config: &'a BootstrapConfig,
}

impl<'a> Bootstrap<'a> {
    /// Creates an orchestrator over the given runtime and host lookups.
    #[must_use]
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        external: &'a dyn ExternalIpResolver,
        route: &'a dyn DefaultRouteResolver,
        config: &'a BootstrapConfig,
    ) -> Self {
        Self {
            runtime,
            external,
            route,
            config,
        }
    }

    /// Builds the launch request for a join without touching any container.
    ///
    /// # Errors
    ///
    /// Returns an error if the router cannot be located, the advertisement
    /// cannot be resolved, or any address, port or endpoint is malformed.
    pub fn plan(&self, options: JoinOptions) -> Result<LaunchRequest> {
        let router = self.locate_router(options.router.as_deref())?;
        tracing::debug!(router = %router.address, remote = router.remote, "router located");

        let advertise = AdvertiseResolver::new(self.external, self.route, ROUTER_PEER_PORT)
            .resolve(&options.advertise, &router)?;

        let discovered_port = options
            .discovered_port
            .as_deref()
            .map(|p| validator::parse_port(p, "discovered port"))
            .transpose()?;

        let transformed = endpoint::transform(&options.endpoint)?;

        let mut runtime_args = self.config.extra_runtime_args.clone();
        runtime_args.extend(options.runtime_args);

        Ok(LaunchRequest {
            name: self.config.discovery_container.clone(),
            image: self.config.image(),
            status_iface: DISCOVERY_STATUS_IFACE.to_string(),
            status_port: DISCOVERY_STATUS_PORT,
            advertise,
            discovered_port,
            router_url: format!("http://{}:{ROUTER_STATUS_PORT}", router.address.host),
            endpoint: transformed.endpoint,
            mount: transformed.mount,
            env: vec![(
                OVERLAY_OPT_OUT_ENV.0.to_string(),
                OVERLAY_OPT_OUT_ENV.1.to_string(),
            )],
            runtime_args,
        })
    }

    /// Plans a join, clears a stale discovery container, and launches.
    ///
    /// # Errors
    ///
    /// Returns any planning error, a lifecycle error if a discovery
    /// container is already running or the name is taken, or the runtime's
    /// launch error.
    pub fn join(&self, options: JoinOptions) -> Result<ContainerId> {
        let request = self.plan(options)?;
        Lifecycle::new(self.runtime).check_not_running(&request.name, &request.image)?;
        tracing::info!(name = %request.name, image = %request.image, "launching discovery container");
        self.runtime.run(&request)
    }

    /// Stops and removes the discovery container, best effort.
    pub fn leave(&self) -> LeaveOutcome {
        let name = &self.config.discovery_container;
        tracing::info!(name = %name, "leaving discovery");
        Lifecycle::new(self.runtime).stop(name)
    }

    fn locate_router(&self, explicit: Option<&str>) -> Result<RouterLocation> {
        if let Some(addr) = explicit {
            return Ok(RouterLocation {
                address: validator::parse_address(addr, "router")?,
                remote: true,
            });
        }
        let found = Lifecycle::new(self.runtime).resolve_router_ip(&self.config.router_container)?;
        Ok(RouterLocation {
            address: validator::parse_address(&found.host, "router")?,
            remote: false,
        })
    }
}
