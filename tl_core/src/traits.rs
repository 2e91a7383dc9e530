//! Core traits for the pluggable backends

use std::fmt::Debug;

/// Database engine selected by `database-backend`.
pub trait DatabaseEngine: Send + Sync + Debug {
    /// Discriminant this engine was registered under.
    fn backend(&self) -> &'static str;

    /// Connection string handed to the driver.
    fn dsn(&self) -> &str;

    /// Connection string safe for logs (credentials masked).
    fn describe(&self) -> String {
        self.dsn().to_string()
    }
}

/// OAuth provider selected by `oauth-provider`.
pub trait AuthProvider: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// URL the user is redirected to in order to start the OAuth flow.
    fn authorize_url(&self, state: &str) -> String;
}

/// Storage resolver selected by a `*-storage-resolver` flag.
pub trait StorageResolver: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Location clients download the artifact stored under `key` from.
    fn locate(&self, key: &str) -> String;
}
