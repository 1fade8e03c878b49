//! System-wide constants and defaults.

/// Port on which the overlay router accepts peer connections.
pub const ROUTER_PEER_PORT: u16 = 6783;

/// Port on which the overlay router serves its HTTP status endpoint.
pub const ROUTER_STATUS_PORT: u16 = 6784;

/// Port on which the discovery process serves its own status endpoint.
pub const DISCOVERY_STATUS_PORT: u16 = 6789;

/// Interface inside the discovery container that the status endpoint binds to.
pub const DISCOVERY_STATUS_IFACE: &str = "eth0";

/// Directory inside the discovery container where `file://` backends are mounted.
pub const FILE_STAGING_DIR: &str = "/tmp";

/// Default image repository for the discovery process.
pub const DEFAULT_IMAGE_REPO: &str = "weaveworks/discovery";

/// Default image tag for the discovery process.
pub const DEFAULT_IMAGE_VERSION: &str = "latest";

/// Default name of the discovery container.
pub const DEFAULT_DISCOVERY_CONTAINER: &str = "weavediscovery";

/// Default name of the overlay router container.
pub const DEFAULT_ROUTER_CONTAINER: &str = "weave";

/// Default container runtime client binary.
pub const DEFAULT_RUNTIME_BINARY: &str = "docker";

/// Environment override that keeps the discovery container off the overlay.
pub const OVERLAY_OPT_OUT_ENV: (&str, &str) = ("WEAVE_CIDR", "none");
