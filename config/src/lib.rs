//! # Configuration System
//!
//! Startup configuration resolution for the Terralist server.
//!
//! This crate provides:
//! - A registry of typed flag declarations
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (JSON/YAML/TOML/HCL/INI/env/properties)
//! - `${VAR}` / `${VAR:default}` interpolation
//! - Configuration precedence (CLI > env > file > defaults)
//! - Typed coercion and aggregate validation
//!
//! Configuration is resolved once at startup and is immutable afterwards.

pub mod file_loader;
pub mod flags;
pub mod interpolation;
pub mod loader;
pub mod precedence;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod validator;

pub use file_loader::{ConfigFormat, load_from_file};
pub use flags::terralist_registry;
pub use interpolation::interpolate;
pub use loader::{ENV_PREFIX, Environment, ProcessEnv, env_var_name, load_from_env};
pub use precedence::{file_entries, merge_configs};
pub use registry::{FlagRegistry, FlagSpec, Rule};
pub use resolver::{CONFIG_FLAG, ConfigResolver};
pub use types::{
    CliValues, FlagKind, FlagValue, RawEntry, RawValue, RawValueSet, ResolvedConfig,
    ResolvedValue, ValueSource,
};
pub use crate::validator::resolve;
