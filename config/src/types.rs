//! # Configuration Value Types
//!
//! Typed and untyped flag values, their provenance, and the two value sets
//! the resolution pipeline passes along: [`RawValueSet`] (merged, untyped)
//! and [`ResolvedConfig`] (coerced, validated, immutable).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use strum::{Display, EnumString};

/// Declared semantic type of a flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    String,
    Integer,
    Boolean
}

/// A typed flag value. Exactly one variant per flag, fixed by its
/// [`FlagKind`]; consumers match on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    String(String),
    Integer(i64),
    Boolean(bool)
}

impl FlagValue {
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::String(_) => FlagKind::String,
            Self::Integer(_) => FlagKind::Integer,
            Self::Boolean(_) => FlagKind::Boolean
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}")
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// An untyped value as a source supplied it.
///
/// Command-line and environment values are always text; structured config
/// files may carry native integers and booleans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    Boolean(bool)
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}")
        }
    }
}

impl From<FlagValue> for RawValue {
    fn from(value: FlagValue) -> Self {
        match value {
            FlagValue::String(s) => Self::Text(s),
            FlagValue::Integer(i) => Self::Integer(i),
            FlagValue::Boolean(b) => Self::Boolean(b)
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Where a value came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueSource {
    Default,
    ConfigFile(PathBuf),
    EnvVar(String),
    CommandLine
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::ConfigFile(path) => write!(f, "file:{}", path.display()),
            ValueSource::EnvVar(name) => write!(f, "env:{name}"),
            ValueSource::CommandLine => write!(f, "flag")
        }
    }
}

/// A raw value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub value: RawValue,
    pub source: ValueSource
}

impl RawEntry {
    pub fn new(value: RawValue, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Values passed explicitly on the command line, keyed by flag name.
///
/// A flag that was not passed has no entry, even if its default would
/// equal a value found in another source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliValues {
    values: BTreeMap<String, String>
}

impl CliValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Merged, untyped values keyed by flag name.
///
/// Keys are always registered flag names; the merge engine drops anything
/// else before it gets here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawValueSet {
    entries: BTreeMap<String, RawEntry>
}

impl RawValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or override the entry for `name`, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, entry: RawEntry) -> Option<RawEntry> {
        self.entries.insert(name.into(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&RawEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawEntry)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut RawEntry)> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A coerced, validated value with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: FlagValue,
    pub source: ValueSource
}

impl ResolvedValue {
    pub fn new(value: FlagValue, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// The final configuration: one typed value per registered flag.
///
/// Built once by [`crate::validator::resolve`] and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    values: BTreeMap<String, ResolvedValue>,
    sensitive: BTreeSet<String>
}

impl ResolvedConfig {
    pub(crate) fn new(values: BTreeMap<String, ResolvedValue>, sensitive: BTreeSet<String>) -> Self {
        Self { values, sensitive }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.value.as_str())
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.value.as_int())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.value.as_bool())
    }

    pub fn source(&self, name: &str) -> Option<&ValueSource> {
        self.get(name).map(|v| &v.source)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResolvedValue)> {
        self.values.iter()
    }

    /// `(flag, value, source)` rows for every flag. Sensitive values that
    /// are set are shown as `***`.
    pub fn explain(&self) -> Vec<(String, String, String)> {
        self.values
            .iter()
            .map(|(name, resolved)| {
                let shown = match &resolved.value {
                    FlagValue::String(s) if !s.is_empty() && self.sensitive.contains(name) => {
                        "***".to_string()
                    }
                    other => other.to_string()
                };
                (name.clone(), shown, resolved.source.to_string())
            })
            .collect()
    }
}
