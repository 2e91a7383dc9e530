//! Startup failures of the `terralist` binary.

use std::path::PathBuf;

use errors::{BackendError, ConfigError, RegistryError};
use thiserror::Error;

/// Anything that stops the server from starting. Each variant is logged as
/// one line before the process exits non-zero.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("could not prepare home directory {}: {source}", .path.display())]
    Home {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Server(#[from] anyhow::Error)
}
