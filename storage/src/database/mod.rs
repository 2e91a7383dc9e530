//! Database engine dispatch.

pub mod postgresql;
pub mod sqlite;

use config::ResolvedConfig;
use config::flags;
use errors::BackendError;
use tl_core::{BackendCategory, BackendRegistry, DatabaseEngine};

/// Every database sub-setting any engine may need, taken from the
/// resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub sqlite_path: String,
    pub postgres_url: String,
    pub postgres_username: String,
    pub postgres_password: String,
    pub postgres_host: String,
    pub postgres_port: i64,
    pub postgres_database: String
}

impl DatabaseSettings {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let text = |name: &str| config.get_str(name).unwrap_or_default().to_string();
        Self {
            sqlite_path: text(flags::SQLITE_PATH),
            postgres_url: text(flags::POSTGRES_URL),
            postgres_username: text(flags::POSTGRES_USERNAME),
            postgres_password: text(flags::POSTGRES_PASSWORD),
            postgres_host: text(flags::POSTGRES_HOST),
            postgres_port: config.get_int(flags::POSTGRES_PORT).unwrap_or(5432),
            postgres_database: text(flags::POSTGRES_DATABASE)
        }
    }
}

pub type DatabaseRegistry = BackendRegistry<DatabaseSettings, dyn DatabaseEngine>;

/// Table of every supported database engine.
pub fn registry() -> Result<DatabaseRegistry, BackendError> {
    let mut registry = DatabaseRegistry::new(BackendCategory::Database);
    registry.register(sqlite::NAME, sqlite::build)?;
    registry.register(postgresql::NAME, postgresql::build)?;
    Ok(registry)
}
