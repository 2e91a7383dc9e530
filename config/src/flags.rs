//! Terralist server flag declarations.

use errors::RegistryError;

use crate::registry::{FlagRegistry, FlagSpec};

pub const CONFIG: &str = "config";
pub const LOG_LEVEL: &str = "log-level";
pub const PORT: &str = "port";
pub const URL: &str = "url";
pub const TOKEN_SIGNING_SECRET: &str = "token-signing-secret";

pub const OAUTH_PROVIDER: &str = "oauth-provider";
pub const GH_CLIENT_ID: &str = "gh-client-id";
pub const GH_CLIENT_SECRET: &str = "gh-client-secret";
pub const GH_ORGANIZATION: &str = "gh-organization";

pub const DATABASE_BACKEND: &str = "database-backend";
pub const SQLITE_PATH: &str = "sqlite-path";
pub const POSTGRES_URL: &str = "postgres-url";
pub const POSTGRES_USERNAME: &str = "postgres-username";
pub const POSTGRES_PASSWORD: &str = "postgres-password";
pub const POSTGRES_HOST: &str = "postgres-host";
pub const POSTGRES_PORT: &str = "postgres-port";
pub const POSTGRES_DATABASE: &str = "postgres-database";

pub const MODULES_STORAGE_RESOLVER: &str = "modules-storage-resolver";
pub const PROVIDERS_STORAGE_RESOLVER: &str = "providers-storage-resolver";
pub const HOME: &str = "home";
pub const S3_BUCKET_NAME: &str = "s3-bucket-name";
pub const S3_BUCKET_REGION: &str = "s3-bucket-region";
pub const S3_ACCESS_KEY_ID: &str = "s3-access-key-id";
pub const S3_SECRET_ACCESS_KEY: &str = "s3-secret-access-key";
pub const S3_PRESIGN_EXPIRE: &str = "s3-presign-expire";

pub const DEBUG: &str = "debug";

/// Accepted values of `log-level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn declarations() -> Vec<FlagSpec> {
    vec![
        FlagSpec::string(CONFIG).description("Path to a configuration file"),
        FlagSpec::string(LOG_LEVEL)
            .default_value("info")
            .one_of(&LOG_LEVELS)
            .description("Log level"),
        FlagSpec::integer(PORT)
            .default_value(5758)
            .range(1, 65535)
            .description("Port to listen on"),
        FlagSpec::string(URL)
            .default_value("http://localhost:5758")
            .description("Public URL of the server, used to build redirects"),
        FlagSpec::string(TOKEN_SIGNING_SECRET)
            .required()
            .sensitive()
            .description("Secret used to sign authentication tokens"),
        FlagSpec::string(OAUTH_PROVIDER)
            .required()
            .description("OAuth provider used to authenticate users"),
        FlagSpec::string(GH_CLIENT_ID).description("GitHub OAuth application client ID"),
        FlagSpec::string(GH_CLIENT_SECRET)
            .sensitive()
            .description("GitHub OAuth application client secret"),
        FlagSpec::string(GH_ORGANIZATION)
            .description("GitHub organization whose members may log in"),
        FlagSpec::string(DATABASE_BACKEND)
            .default_value("sqlite")
            .description("Database engine"),
        FlagSpec::string(SQLITE_PATH)
            .default_value("terralist.db")
            .description("Path of the SQLite database file"),
        FlagSpec::string(POSTGRES_URL)
            .sensitive()
            .description("PostgreSQL connection URL, takes precedence over the individual settings"),
        FlagSpec::string(POSTGRES_USERNAME).description("PostgreSQL username"),
        FlagSpec::string(POSTGRES_PASSWORD)
            .sensitive()
            .description("PostgreSQL password"),
        FlagSpec::string(POSTGRES_HOST).description("PostgreSQL host"),
        FlagSpec::integer(POSTGRES_PORT)
            .default_value(5432)
            .range(1, 65535)
            .description("PostgreSQL port"),
        FlagSpec::string(POSTGRES_DATABASE).description("PostgreSQL database name"),
        FlagSpec::string(MODULES_STORAGE_RESOLVER)
            .default_value("local")
            .description("Storage resolver for modules"),
        FlagSpec::string(PROVIDERS_STORAGE_RESOLVER)
            .default_value("proxy")
            .description("Storage resolver for providers"),
        FlagSpec::string(HOME)
            .default_value("~/.terralist.d")
            .description("Home directory for local files"),
        FlagSpec::string(S3_BUCKET_NAME).description("S3 bucket name"),
        FlagSpec::string(S3_BUCKET_REGION).description("S3 bucket region"),
        FlagSpec::string(S3_ACCESS_KEY_ID).description("S3 access key ID"),
        FlagSpec::string(S3_SECRET_ACCESS_KEY)
            .sensitive()
            .description("S3 secret access key"),
        FlagSpec::integer(S3_PRESIGN_EXPIRE)
            .default_value(15)
            .range(1, 10080)
            .description("Minutes a presigned S3 URL stays valid"),
        FlagSpec::boolean(DEBUG).hidden().description("Force trace logging"),
    ]
}

/// Registry holding every Terralist server flag.
///
/// # Errors
///
/// Only on a broken declaration list; the built-in one is valid.
pub fn terralist_registry() -> Result<FlagRegistry, RegistryError> {
    FlagRegistry::from_specs(declarations())
}
