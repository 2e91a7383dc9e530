//! Proxy resolver: artifacts stay where their authors published them.

use errors::BackendError;
use tl_core::{BackendCategory, StorageResolver};

use super::StorageSettings;

pub const NAME: &str = "proxy";

#[derive(Debug, Default)]
pub struct ProxyResolver;

impl StorageResolver for ProxyResolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn locate(&self, key: &str) -> String {
        key.to_string()
    }
}

pub fn build(
    _category: BackendCategory,
    _settings: &StorageSettings
) -> Result<Box<dyn StorageResolver>, BackendError> {
    Ok(Box::new(ProxyResolver))
}
