//! Invocation-wide configuration.

use crate::constants;

/// Settings that apply to every command of one invocation.
///
/// The CLI fills this from its global options (which fall back to
/// environment variables); library callers can start from [`Default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Repository of the discovery image.
    pub image_repo: String,
    /// Tag of the discovery image.
    pub image_version: String,
    /// Name of the discovery container.
    pub discovery_container: String,
    /// Name of the overlay router container.
    pub router_container: String,
    /// Extra runtime arguments applied to every discovery launch.
    pub extra_runtime_args: Vec<String>,
}

impl BootstrapConfig {
    /// Full image reference, `repo:tag`.
    #[must_use]
    pub fn image(&self) -> String {
        format!("{}:{}", self.image_repo, self.image_version)
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            image_repo: constants::DEFAULT_IMAGE_REPO.to_string(),
            image_version: constants::DEFAULT_IMAGE_VERSION.to_string(),
            discovery_container: constants::DEFAULT_DISCOVERY_CONTAINER.to_string(),
            router_container: constants::DEFAULT_ROUTER_CONTAINER.to_string(),
            extra_runtime_args: Vec::new(),
        }
    }
}
