//! # Authentication Providers
//!
//! OAuth providers users log in with, selected by `oauth-provider`.

pub mod github;

use config::ResolvedConfig;
use config::flags;
use errors::BackendError;
use tl_core::{AuthProvider, BackendCategory, BackendRegistry};

/// Every auth sub-setting any provider may need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSettings {
    /// Public URL of the Terralist server, used for the OAuth redirect.
    pub server_url: String,
    pub gh_client_id: String,
    pub gh_client_secret: String,
    pub gh_organization: String
}

impl AuthSettings {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let text = |name: &str| config.get_str(name).unwrap_or_default().to_string();
        Self {
            server_url: text(flags::URL),
            gh_client_id: text(flags::GH_CLIENT_ID),
            gh_client_secret: text(flags::GH_CLIENT_SECRET),
            gh_organization: text(flags::GH_ORGANIZATION)
        }
    }
}

pub type AuthRegistry = BackendRegistry<AuthSettings, dyn AuthProvider>;

/// Table of every supported OAuth provider.
pub fn registry() -> Result<AuthRegistry, BackendError> {
    let mut registry = AuthRegistry::new(BackendCategory::Auth);
    registry.register(github::NAME, github::build)?;
    Ok(registry)
}
