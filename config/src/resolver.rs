//! # Configuration Resolver
//!
//! Runs the whole resolution pipeline against one registry:
//!
//! 1. locate the config file (`--config` or `TERRALIST_CONFIG`)
//! 2. merge defaults, file, environment and explicit flags
//! 3. expand `${VAR}` / `${VAR:default}` in string values
//! 4. coerce and validate into a [`ResolvedConfig`]
//!
//! Every step is synchronous and fails fast; nothing is resolved partially.

use std::path::PathBuf;

use errors::ConfigError;
use tracing::debug;

use crate::file_loader::load_from_file;
use crate::interpolation::{has_interpolation, interpolate};
use crate::loader::{ENV_PREFIX, Environment, ProcessEnv, env_var_name, load_from_env};
use crate::precedence::{file_entries, merge_configs};
use crate::registry::FlagRegistry;
use crate::types::{CliValues, RawValue, RawValueSet, ResolvedConfig};
use crate::validator::resolve;

static PROCESS_ENV: ProcessEnv = ProcessEnv;

/// Flag whose value names the configuration file.
pub const CONFIG_FLAG: &str = "config";

/// Resolves a [`ResolvedConfig`] from every configuration source.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Holds the inputs of one resolution pass (registry, environment,
/// explicit command-line values) and runs the pipeline over them.
///
/// ## Usage
/// ```rust
/// use config::{CliValues, ConfigResolver, FlagRegistry, FlagSpec};
/// use std::collections::HashMap;
///
/// let registry = FlagRegistry::from_specs([
///     FlagSpec::string("config"),
///     FlagSpec::integer("port").default_value(5758).range(1, 65535),
/// ]).unwrap();
/// let env: HashMap<String, String> =
///     [("TERRALIST_PORT".to_string(), "${PORT:8080}".to_string())].into();
///
/// let resolved = ConfigResolver::new(&registry)
///     .with_env(&env)
///     .with_cli(CliValues::new())
///     .resolve()
///     .unwrap();
/// assert_eq!(resolved.get_int("port"), Some(8080));
/// ```
pub struct ConfigResolver<'a> {
    registry: &'a FlagRegistry,
    env: &'a dyn Environment,
    prefix: String,
    cli: CliValues
}

impl<'a> ConfigResolver<'a> {
    /// Resolver over the live process environment with the `TERRALIST`
    /// prefix and no command-line values.
    pub fn new(registry: &'a FlagRegistry) -> Self {
        Self {
            registry,
            env: &PROCESS_ENV,
            prefix: ENV_PREFIX.to_string(),
            cli: CliValues::new()
        }
    }

    #[must_use]
    pub fn with_env(mut self, env: &'a dyn Environment) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_cli(mut self, cli: CliValues) -> Self {
        self.cli = cli;
        self
    }

    pub fn registry(&self) -> &FlagRegistry {
        self.registry
    }

    /// Path of the configuration file, if one was given.
    ///
    /// Taken from the explicit `config` flag, then its environment
    /// variable, then its declared default. The path is interpolated
    /// before use; an empty result means no file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Interpolation`] if the path cannot be expanded.
    pub fn config_file(&self) -> Result<Option<PathBuf>, ConfigError> {
        let Ok(spec) = self.registry.lookup(CONFIG_FLAG) else {
            return Ok(None);
        };

        let raw = self
            .cli
            .get(CONFIG_FLAG)
            .map(str::to_string)
            .or_else(|| self.env.var(&env_var_name(&self.prefix, CONFIG_FLAG)))
            .unwrap_or_else(|| spec.default().to_string());

        let path = interpolate(&raw, self.env).map_err(|source| ConfigError::Interpolation {
            flag: CONFIG_FLAG.to_string(),
            source
        })?;

        Ok((!path.is_empty()).then(|| PathBuf::from(path)))
    }

    /// Merge every source, without interpolation or coercion.
    ///
    /// # Errors
    ///
    /// [`ConfigError::File`] if the config file cannot be read or parsed;
    /// [`ConfigError::Interpolation`] if its path cannot be expanded.
    pub fn merge(&self) -> Result<RawValueSet, ConfigError> {
        let file = match self.config_file()? {
            Some(path) => {
                let values = load_from_file(&path)?;
                file_entries(self.registry, &path, values)
            }
            None => Default::default()
        };
        let env = load_from_env(self.registry, self.env, &self.prefix);

        Ok(merge_configs(self.registry, file, env, &self.cli))
    }

    /// Expand interpolation expressions in every text value.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError::Interpolation`] encountered, naming the
    /// flag.
    pub fn interpolate(&self, mut raw: RawValueSet) -> Result<RawValueSet, ConfigError> {
        for (name, entry) in raw.iter_mut() {
            let RawValue::Text(text) = &entry.value else {
                continue;
            };
            if !has_interpolation(text) {
                continue;
            }
            let expanded = interpolate(text, self.env).map_err(|source| ConfigError::Interpolation {
                flag: name.clone(),
                source
            })?;
            entry.value = RawValue::Text(expanded);
        }
        Ok(raw)
    }

    /// Run the full pipeline.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`]; validation failures list every violated flag.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let merged = self.merge()?;
        let interpolated = self.interpolate(merged)?;
        let resolved = resolve(self.registry, &interpolated)?;

        for (flag, value, source) in resolved.explain() {
            debug!(%flag, %value, %source, "Resolved flag");
        }
        Ok(resolved)
    }
}
