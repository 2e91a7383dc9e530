//! GitHub OAuth provider.

use errors::BackendError;
use tl_core::{AuthProvider, BackendCategory};
use tracing::debug;
use url::Url;
use validator::Validate;

use crate::AuthSettings;

pub const NAME: &str = "github";

const AUTHORIZE_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const REDIRECT_PATH: &str = "v1/api/auth/redirect";

#[derive(Debug, Clone, Validate)]
pub struct GithubConfig {
    #[validate(length(min = 1, message = "client ID is required"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "client secret is required"))]
    pub client_secret: String,
    /// Restricts logins to members of this organization when set.
    pub organization: String
}

impl GithubConfig {
    pub fn scopes(&self) -> Vec<&'static str> {
        let mut scopes = vec!["read:user", "user:email"];
        if !self.organization.is_empty() {
            scopes.push("read:org");
        }
        scopes
    }
}

#[derive(Debug)]
pub struct GithubProvider {
    config: GithubConfig,
    endpoint: Url,
    redirect_url: Url
}

impl AuthProvider for GithubProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.redirect_url.as_str())
            .append_pair("scope", &self.config.scopes().join(" "))
            .append_pair("state", state);
        url.to_string()
    }
}

pub fn build(
    category: BackendCategory,
    settings: &AuthSettings
) -> Result<Box<dyn AuthProvider>, BackendError> {
    let config = GithubConfig {
        client_id: settings.gh_client_id.clone(),
        client_secret: settings.gh_client_secret.clone(),
        organization: settings.gh_organization.clone()
    };
    config
        .validate()
        .map_err(|e| BackendError::invalid_config(category, NAME, e))?;

    let mut base = Url::parse(&settings.server_url).map_err(|e| {
        BackendError::invalid_config(category, NAME, format!("invalid server URL '{}': {e}", settings.server_url))
    })?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let redirect_url = base
        .join(REDIRECT_PATH)
        .map_err(|e| BackendError::invalid_config(category, NAME, e))?;

    let endpoint =
        Url::parse(AUTHORIZE_ENDPOINT).map_err(|e| BackendError::initialization(category, NAME, e))?;
    debug!(
        redirect = %redirect_url,
        organization = %config.organization,
        "GitHub provider configured"
    );

    Ok(Box::new(GithubProvider {
        config,
        endpoint,
        redirect_url
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings() -> AuthSettings {
        AuthSettings {
            server_url: "https://registry.example.com".to_string(),
            gh_client_id: "client".to_string(),
            gh_client_secret: "secret".to_string(),
            gh_organization: String::new()
        }
    }

    fn query(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_authorize_url() {
        let provider = build(BackendCategory::Auth, &settings()).unwrap();
        let url = provider.authorize_url("xyz");

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        let query = query(&url);
        assert_eq!(query["client_id"], "client");
        assert_eq!(query["state"], "xyz");
        assert_eq!(query["scope"], "read:user user:email");
        assert_eq!(
            query["redirect_uri"],
            "https://registry.example.com/v1/api/auth/redirect"
        );
    }

    #[test]
    fn test_organization_adds_scope() {
        let settings = AuthSettings {
            gh_organization: "acme".to_string(),
            ..settings()
        };
        let provider = build(BackendCategory::Auth, &settings).unwrap();
        assert_eq!(
            query(&provider.authorize_url("s"))["scope"],
            "read:user user:email read:org"
        );
    }

    #[test]
    fn test_redirect_keeps_base_path() {
        let settings = AuthSettings {
            server_url: "https://example.com/terralist".to_string(),
            ..settings()
        };
        let provider = build(BackendCategory::Auth, &settings).unwrap();
        assert_eq!(
            query(&provider.authorize_url("s"))["redirect_uri"],
            "https://example.com/terralist/v1/api/auth/redirect"
        );
    }

    #[test]
    fn test_credentials_are_required() {
        let settings = AuthSettings {
            gh_client_id: String::new(),
            gh_client_secret: String::new(),
            ..settings()
        };
        let err = build(BackendCategory::Auth, &settings).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("auth backend 'github'"));
        assert!(message.contains("client ID is required"));
        assert!(message.contains("client secret is required"));
    }

    #[test]
    fn test_invalid_server_url() {
        let settings = AuthSettings {
            server_url: "not a url".to_string(),
            ..settings()
        };
        assert!(build(BackendCategory::Auth, &settings).is_err());
    }
}
