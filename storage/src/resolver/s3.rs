//! S3 resolver: artifacts live in a bucket and are served through
//! virtual-hosted-style URLs.

use std::time::Duration;

use errors::BackendError;
use tl_core::{BackendCategory, StorageResolver};
use url::Url;
use validator::Validate;

use super::StorageSettings;

pub const NAME: &str = "s3";

#[derive(Debug, Clone, Validate)]
pub struct S3Config {
    #[validate(length(min = 1, message = "bucket name is required"))]
    pub bucket_name: String,
    #[validate(length(min = 1, message = "bucket region is required"))]
    pub bucket_region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Presigned link lifetime, in minutes.
    #[validate(range(min = 1, max = 10080, message = "presign expiry must be between 1 and 10080 minutes"))]
    pub link_expire: i64
}

#[derive(Debug)]
pub struct S3Resolver {
    config: S3Config,
    endpoint: Url
}

impl S3Resolver {
    pub fn bucket(&self) -> &str {
        &self.config.bucket_name
    }

    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.config.link_expire.unsigned_abs() * 60)
    }

    /// Whether static credentials were configured; otherwise the ambient
    /// AWS credential chain applies.
    pub fn has_static_credentials(&self) -> bool {
        !self.config.access_key_id.is_empty() && !self.config.secret_access_key.is_empty()
    }
}

impl StorageResolver for S3Resolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn locate(&self, key: &str) -> String {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(key.split('/'));
        }
        url.to_string()
    }
}

pub fn build(
    category: BackendCategory,
    settings: &StorageSettings
) -> Result<Box<dyn StorageResolver>, BackendError> {
    let config = S3Config {
        bucket_name: settings.s3_bucket_name.clone(),
        bucket_region: settings.s3_bucket_region.clone(),
        access_key_id: settings.s3_access_key_id.clone(),
        secret_access_key: settings.s3_secret_access_key.clone(),
        link_expire: settings.s3_presign_expire
    };
    config
        .validate()
        .map_err(|e| BackendError::invalid_config(category, NAME, e))?;

    let endpoint = Url::parse(&format!(
        "https://{}.s3.{}.amazonaws.com/",
        config.bucket_name, config.bucket_region
    ))
    .map_err(|e| BackendError::invalid_config(category, NAME, format!("invalid bucket endpoint: {e}")))?;

    Ok(Box::new(S3Resolver { config, endpoint }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StorageSettings {
        StorageSettings {
            s3_bucket_name: "terralist-modules".to_string(),
            s3_bucket_region: "eu-central-1".to_string(),
            s3_presign_expire: 15,
            ..Default::default()
        }
    }

    #[test]
    fn test_virtual_hosted_locations() {
        let resolver = build(BackendCategory::ModulesStorage, &settings()).unwrap();
        assert_eq!(
            resolver.locate("hashicorp/aws/5.0.0.zip"),
            "https://terralist-modules.s3.eu-central-1.amazonaws.com/hashicorp/aws/5.0.0.zip"
        );
        assert_eq!(
            resolver.locate("my module/v1.zip"),
            "https://terralist-modules.s3.eu-central-1.amazonaws.com/my%20module/v1.zip"
        );
    }

    #[test]
    fn test_bucket_and_region_are_required() {
        let err = build(BackendCategory::ModulesStorage, &StorageSettings {
            s3_presign_expire: 15,
            ..Default::default()
        })
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("modules storage"));
        assert!(message.contains("bucket name is required"));
        assert!(message.contains("bucket region is required"));
    }

    #[test]
    fn test_presign_expiry() {
        let config = S3Config {
            bucket_name: "b".to_string(),
            bucket_region: "r".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            link_expire: 30
        };
        let endpoint = Url::parse("https://b.s3.r.amazonaws.com/").unwrap();
        let resolver = S3Resolver { config, endpoint };

        assert_eq!(resolver.expires_in(), Duration::from_secs(1800));
        assert_eq!(resolver.bucket(), "b");
        assert!(!resolver.has_static_credentials());

        let err = build(BackendCategory::ModulesStorage, &StorageSettings {
            s3_presign_expire: 0,
            ..settings()
        })
        .unwrap_err();
        assert!(err.to_string().contains("presign expiry"));
    }
}
