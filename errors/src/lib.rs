//! # Terralist Errors
//!
//! Error taxonomy for the startup configuration pipeline.
//!
//! Every error here aborts startup. None of them are retried: configuration
//! is deterministic, so a retry against an unchanged environment would
//! reproduce the same failure.
//!
//! - [`RegistryError`]: flag registry misuse (programmer error)
//! - [`ConfigFileError`]: unreadable, unparsable or unsupported config file
//! - [`InterpolationError`]: `${VAR}` expansion failures
//! - [`ValidationError`]: every per-flag violation found in one pass
//! - [`BackendError`]: backend selection and construction failures
//! - [`ConfigError`]: umbrella for the resolution phase

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Flag registry misuse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("flag '{name}' is already registered")]
    DuplicateFlag { name: String },

    #[error("flag '{name}' is not registered")]
    UnknownFlag { name: String },

    #[error("flag name '{name}' is not kebab-case")]
    InvalidFlagName { name: String },

    #[error("default value of flag '{name}' is not a {expected}")]
    InvalidDefault { name: String, expected: String }
}

/// Configuration file failures. Every variant carries the file path.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },

    #[error("could not parse {format} config file {}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        format: String,
        reason: String
    },

    #[error("config file {} has no extension, cannot infer its format", .path.display())]
    NoExtension { path: PathBuf },

    #[error("config file {} has unsupported extension '{extension}'", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String }
}

impl ConfigFileError {
    pub fn parse(path: impl Into<PathBuf>, format: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            format: format.to_string(),
            reason: reason.to_string()
        }
    }

    /// Path of the file that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::NoExtension { path }
            | Self::UnsupportedFormat { path, .. } => path
        }
    }
}

/// `${VAR}` / `${VAR:default}` expansion failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("environment variable '{variable}' is not set and no default was given")]
    MissingVariable { variable: String },

    #[error("malformed interpolation at byte {position}: {reason}")]
    Syntax { position: usize, reason: String }
}

/// What went wrong with a single flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Required flag with no (or an empty) value from any source.
    Missing,
    /// Value could not be coerced to the declared type.
    TypeMismatch { expected: String, found: String },
    /// Integer outside its allowed range.
    OutOfRange { min: i64, max: i64, value: i64 },
    /// String not among the allowed values.
    NotAllowed { value: String, allowed: Vec<String> }
}

/// A single flag violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub flag: String,
    pub kind: ViolationKind
}

impl Violation {
    pub fn new(flag: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            flag: flag.into(),
            kind
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "{}: required but not set", self.flag),
            ViolationKind::TypeMismatch { expected, found } => {
                write!(f, "{}: expected {expected}, found {found:?}", self.flag)
            }
            ViolationKind::OutOfRange { min, max, value } => {
                write!(f, "{}: {value} is outside the range {min}..={max}", self.flag)
            }
            ViolationKind::NotAllowed { value, allowed } => write!(
                f,
                "{}: {value:?} is not one of [{}]",
                self.flag,
                allowed.join(", ")
            )
        }
    }
}

/// Aggregate of every flag violation found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Names of the flags that failed, in registry order.
    pub fn flags(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.flag.as_str()).collect()
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.violations.iter().any(|v| v.flag == flag)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Backend selection and construction failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("unsupported {category} backend '{value}' (supported: {})", .known.join(", "))]
    Unsupported {
        category: String,
        value: String,
        known: Vec<String>
    },

    #[error("{category} backend '{name}' is registered twice")]
    DuplicateBackend { category: String, name: String },

    #[error("invalid configuration for {category} backend '{backend}': {reason}")]
    InvalidConfig {
        category: String,
        backend: String,
        reason: String
    },

    #[error("could not initialize {category} backend '{backend}': {reason}")]
    Initialization {
        category: String,
        backend: String,
        reason: String
    }
}

impl BackendError {
    pub fn invalid_config(
        category: impl fmt::Display,
        backend: impl Into<String>,
        reason: impl fmt::Display
    ) -> Self {
        Self::InvalidConfig {
            category: category.to_string(),
            backend: backend.into(),
            reason: reason.to_string()
        }
    }

    pub fn initialization(
        category: impl fmt::Display,
        backend: impl Into<String>,
        reason: impl fmt::Display
    ) -> Self {
        Self::Initialization {
            category: category.to_string(),
            backend: backend.into(),
            reason: reason.to_string()
        }
    }
}

/// Any failure of the resolution phase (registry, file, interpolation,
/// validation).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    File(#[from] ConfigFileError),

    #[error("could not interpolate flag '{flag}': {source}")]
    Interpolation {
        flag: String,
        #[source]
        source: InterpolationError
    },

    #[error(transparent)]
    Validation(#[from] ValidationError)
}
