//! Storage resolver dispatch.
//!
//! Modules and providers each select their own resolver; both tables are
//! built from the same constructors but report errors under their own
//! category.

pub mod local;
pub mod proxy;
pub mod s3;

use std::path::PathBuf;

use config::ResolvedConfig;
use config::flags;
use errors::BackendError;
use tl_core::{BackendCategory, BackendRegistry, StorageResolver};

/// Every storage sub-setting any resolver may need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageSettings {
    /// Absolute, existing home directory.
    pub home: PathBuf,
    pub s3_bucket_name: String,
    pub s3_bucket_region: String,
    pub s3_access_key_id: String,
    pub s3_secret_access_key: String,
    pub s3_presign_expire: i64
}

impl StorageSettings {
    pub fn from_config(config: &ResolvedConfig, home: PathBuf) -> Self {
        let text = |name: &str| config.get_str(name).unwrap_or_default().to_string();
        Self {
            home,
            s3_bucket_name: text(flags::S3_BUCKET_NAME),
            s3_bucket_region: text(flags::S3_BUCKET_REGION),
            s3_access_key_id: text(flags::S3_ACCESS_KEY_ID),
            s3_secret_access_key: text(flags::S3_SECRET_ACCESS_KEY),
            s3_presign_expire: config.get_int(flags::S3_PRESIGN_EXPIRE).unwrap_or(15)
        }
    }
}

pub type ResolverRegistry = BackendRegistry<StorageSettings, dyn StorageResolver>;

/// Table of every supported storage resolver, for `category`.
pub fn registry(category: BackendCategory) -> Result<ResolverRegistry, BackendError> {
    let mut registry = ResolverRegistry::new(category);
    registry.register(proxy::NAME, proxy::build)?;
    registry.register(local::NAME, local::build)?;
    registry.register(s3::NAME, s3::build)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names() {
        let registry = registry(BackendCategory::ModulesStorage).unwrap();
        assert_eq!(registry.names(), vec!["local", "proxy", "s3"]);
    }

    #[test]
    fn test_categories_are_independent() {
        let settings = StorageSettings {
            s3_bucket_name: "modules".to_string(),
            s3_bucket_region: "eu-west-1".to_string(),
            s3_presign_expire: 15,
            ..Default::default()
        };

        let modules = registry(BackendCategory::ModulesStorage)
            .unwrap()
            .build("s3", &settings)
            .unwrap();
        let providers = registry(BackendCategory::ProvidersStorage)
            .unwrap()
            .build("proxy", &settings)
            .unwrap();

        assert_eq!(modules.name(), "s3");
        assert_eq!(providers.name(), "proxy");
    }

    #[test]
    fn test_unknown_resolver_names_category() {
        let err = registry(BackendCategory::ProvidersStorage)
            .unwrap()
            .build("gcs", &StorageSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Unsupported { ref category, ref value, .. }
                if category == "providers storage" && value == "gcs"
        ));
    }
}
