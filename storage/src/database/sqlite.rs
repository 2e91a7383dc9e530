//! SQLite database engine.

use errors::BackendError;
use tl_core::{BackendCategory, DatabaseEngine};
use validator::Validate;

use super::DatabaseSettings;

pub const NAME: &str = "sqlite";

#[derive(Debug, Clone, Validate)]
pub struct SqliteConfig {
    #[validate(length(min = 1, message = "database file path is required"))]
    pub path: String
}

#[derive(Debug)]
pub struct SqliteEngine {
    config: SqliteConfig,
    dsn: String
}

impl SqliteEngine {
    pub fn new(config: SqliteConfig) -> Self {
        let dsn = format!("sqlite://{}?mode=rwc", config.path);
        Self { config, dsn }
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }
}

impl DatabaseEngine for SqliteEngine {
    fn backend(&self) -> &'static str {
        NAME
    }

    fn dsn(&self) -> &str {
        &self.dsn
    }
}

pub fn build(
    category: BackendCategory,
    settings: &DatabaseSettings
) -> Result<Box<dyn DatabaseEngine>, BackendError> {
    let config = SqliteConfig {
        path: settings.sqlite_path.clone()
    };
    config
        .validate()
        .map_err(|e| BackendError::invalid_config(category, NAME, e))?;

    Ok(Box::new(SqliteEngine::new(config)))
}
