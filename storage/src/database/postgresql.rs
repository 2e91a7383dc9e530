//! PostgreSQL database engine.
//!
//! Connects either through a full connection URL or through the individual
//! host/port/database/credential settings. The URL wins when both are set.

use std::borrow::Cow;

use errors::BackendError;
use tl_core::{BackendCategory, DatabaseEngine};
use url::Url;
use validator::Validate;

use super::DatabaseSettings;

pub const NAME: &str = "postgresql";

#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "validate_target"))]
pub struct PostgresConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub host: String,
    #[validate(range(min = 1, max = 65535, message = "port must be between 1 and 65535"))]
    pub port: i64,
    pub database: String
}

fn validate_target(config: &PostgresConfig) -> Result<(), validator::ValidationError> {
    if !config.url.is_empty() || (!config.host.is_empty() && !config.database.is_empty()) {
        return Ok(());
    }
    Err(validator::ValidationError::new("target").with_message(Cow::Borrowed(
        "either a connection URL or both host and database are required"
    )))
}

impl PostgresConfig {
    /// Connection URL with credentials percent-encoded.
    pub fn connection_url(&self) -> Result<Url, String> {
        if !self.url.is_empty() {
            let url = Url::parse(&self.url).map_err(|e| format!("invalid connection URL: {e}"))?;
            if !matches!(url.scheme(), "postgres" | "postgresql") {
                return Err(format!("unsupported URL scheme '{}'", url.scheme()));
            }
            return Ok(url);
        }

        let mut url = Url::parse(&format!("postgres://{}", self.host))
            .map_err(|e| format!("invalid host '{}': {e}", self.host))?;
        let port = u16::try_from(self.port).map_err(|_| format!("invalid port {}", self.port))?;
        url.set_port(Some(port))
            .map_err(|()| format!("invalid port {port}"))?;
        if !self.username.is_empty() {
            url.set_username(&self.username)
                .map_err(|()| "invalid username".to_string())?;
        }
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|()| "invalid password".to_string())?;
        }
        url.set_path(&self.database);
        Ok(url)
    }
}

#[derive(Debug)]
pub struct PostgresEngine {
    url: Url
}

impl DatabaseEngine for PostgresEngine {
    fn backend(&self) -> &'static str {
        NAME
    }

    fn dsn(&self) -> &str {
        self.url.as_str()
    }

    fn describe(&self) -> String {
        let mut redacted = self.url.clone();
        // Only fails for URLs that cannot carry credentials, and this one
        // already does.
        if redacted.password().is_some() && redacted.set_password(Some("***")).is_err() {
            return format!("{}://***", redacted.scheme());
        }
        redacted.to_string()
    }
}

pub fn build(
    category: BackendCategory,
    settings: &DatabaseSettings
) -> Result<Box<dyn DatabaseEngine>, BackendError> {
    let config = PostgresConfig {
        url: settings.postgres_url.clone(),
        username: settings.postgres_username.clone(),
        password: settings.postgres_password.clone(),
        host: settings.postgres_host.clone(),
        port: settings.postgres_port,
        database: settings.postgres_database.clone()
    };
    config
        .validate()
        .map_err(|e| BackendError::invalid_config(category, NAME, e))?;

    let url = config
        .connection_url()
        .map_err(|reason| BackendError::invalid_config(category, NAME, reason))?;

    Ok(Box::new(PostgresEngine { url }))
}
