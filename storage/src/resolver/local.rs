//! Local resolver: artifacts live under `<home>/store`.

use std::fs;
use std::path::{Path, PathBuf};

use errors::BackendError;
use tl_core::{BackendCategory, StorageResolver};
use tracing::debug;
use validator::Validate;

use super::StorageSettings;

pub const NAME: &str = "local";

const STORE_DIR: &str = "store";

fn validate_absolute(path: &PathBuf) -> Result<(), validator::ValidationError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(validator::ValidationError::new("absolute")
            .with_message("home directory must be an absolute path".into()))
    }
}

#[derive(Debug, Clone, Validate)]
pub struct LocalConfig {
    #[validate(custom(function = "validate_absolute"))]
    pub home_directory: PathBuf
}

#[derive(Debug)]
pub struct LocalResolver {
    store: PathBuf
}

impl LocalResolver {
    pub fn store(&self) -> &Path {
        &self.store
    }
}

impl StorageResolver for LocalResolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn locate(&self, key: &str) -> String {
        self.store.join(key).to_string_lossy().into_owned()
    }
}

pub fn build(
    category: BackendCategory,
    settings: &StorageSettings
) -> Result<Box<dyn StorageResolver>, BackendError> {
    let config = LocalConfig {
        home_directory: settings.home.clone()
    };
    config
        .validate()
        .map_err(|e| BackendError::invalid_config(category, NAME, e))?;

    let store = config.home_directory.join(STORE_DIR);
    fs::create_dir_all(&store).map_err(|e| {
        BackendError::initialization(category, NAME, format!("creating {}: {e}", store.display()))
    })?;
    debug!(store = %store.display(), "Local store ready");

    Ok(Box::new(LocalResolver { store }))
}
