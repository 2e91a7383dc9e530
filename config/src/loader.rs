//! # Environment Variable Loader
//!
//! Reads flag values from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! `PREFIX_` + flag name uppercased with `-` replaced by `_`:
//! - `log-level` → `TERRALIST_LOG_LEVEL`
//! - `s3-bucket-name` → `TERRALIST_S3_BUCKET_NAME`
//!
//! A variable that is set but empty counts as unset.

use std::collections::{BTreeMap, HashMap};
use std::env;

use tracing::trace;

use crate::registry::FlagRegistry;
use crate::types::{RawEntry, RawValue, ValueSource};

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "TERRALIST";

/// Read-only view of an environment.
///
/// Implementations return `None` for variables that are unset or empty.
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The live process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Environment variable that sets `flag`.
pub fn env_var_name(prefix: &str, flag: &str) -> String {
    let key = flag.replace('-', "_").to_uppercase();
    if prefix.is_empty() {
        key
    } else {
        format!("{}_{key}", prefix.to_uppercase())
    }
}

/// Collect every registered flag that is set in `env`.
///
/// Values are kept as text; interpolation and coercion happen later.
pub fn load_from_env(
    registry: &FlagRegistry,
    env: &dyn Environment,
    prefix: &str
) -> BTreeMap<String, RawEntry> {
    let mut values = BTreeMap::new();

    for spec in registry.all() {
        let key = env_var_name(prefix, spec.name());
        if let Some(value) = env.var(&key) {
            trace!(flag = spec.name(), variable = %key, "Flag set from environment");
            values.insert(
                spec.name().to_string(),
                RawEntry::new(RawValue::Text(value), ValueSource::EnvVar(key))
            );
        }
    }

    values
}
