//! # Flag Specification Registry
//!
//! Declares every configurable option: name, type, default, required-ness
//! and visibility. The registry is assembled once at startup and only read
//! afterwards; it is passed explicitly to every pipeline stage.

use std::collections::HashMap;

use errors::RegistryError;

use crate::loader::env_var_name;
use crate::types::{FlagKind, FlagValue};

/// Per-flag validation rule applied after coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Inclusive integer range.
    Range { min: i64, max: i64 },
    /// Allowed string values.
    OneOf(Vec<String>)
}

/// Declaration of a single flag.
///
/// Built with a small builder:
///
/// ```rust
/// use config::FlagSpec;
///
/// let port = FlagSpec::integer("port")
///     .default_value(5758)
///     .range(1, 65535)
///     .description("Port to listen on");
/// assert_eq!(port.name(), "port");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    name: String,
    kind: FlagKind,
    default: FlagValue,
    required: bool,
    hidden: bool,
    sensitive: bool,
    description: String,
    rule: Option<Rule>
}

impl FlagSpec {
    fn new(name: impl Into<String>, kind: FlagKind, default: FlagValue) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
            required: false,
            hidden: false,
            sensitive: false,
            description: String::new(),
            rule: None
        }
    }

    /// String flag, empty by default.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String, FlagValue::String(String::new()))
    }

    /// Integer flag, zero by default.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Integer, FlagValue::Integer(0))
    }

    /// Boolean flag, false by default.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Boolean, FlagValue::Boolean(false))
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<FlagValue>) -> Self {
        self.default = value.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mask the value in logs and in [`crate::ResolvedConfig::explain`].
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    #[must_use]
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.rule = Some(Rule::Range { min, max });
        self
    }

    #[must_use]
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.rule = Some(Rule::OneOf(values.iter().map(|v| v.to_string()).collect()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn default(&self) -> &FlagValue {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn help(&self) -> &str {
        &self.description
    }

    pub fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    /// Environment variable that sets this flag, e.g. `TERRALIST_LOG_LEVEL`.
    pub fn env_var(&self, prefix: &str) -> String {
        env_var_name(prefix, &self.name)
    }

    /// Help text with the default value and rule appended, as shown by
    /// `--help`.
    pub fn usage(&self) -> String {
        let mut usage = self.description.clone();
        let mut notes = Vec::new();

        if self.required {
            notes.push("required".to_string());
        } else {
            match &self.default {
                FlagValue::String(s) if s.is_empty() => {}
                default => notes.push(format!("default: {default}"))
            }
        }
        match &self.rule {
            Some(Rule::Range { min, max }) => notes.push(format!("range: {min}-{max}")),
            Some(Rule::OneOf(values)) => notes.push(format!("one of: {}", values.join(", "))),
            None => {}
        }

        if !notes.is_empty() {
            if !usage.is_empty() {
                usage.push(' ');
            }
            usage.push_str(&format!("[{}]", notes.join("; ")));
        }
        usage
    }
}

fn is_kebab_case(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.ends_with('-')
        && !name.contains("--")
}

/// Ordered set of flag declarations with unique names.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    specs: Vec<FlagSpec>,
    index: HashMap<String, usize>
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of declarations, in order.
    ///
    /// # Errors
    ///
    /// The first [`RegistryError`] any declaration triggers.
    pub fn from_specs(specs: impl IntoIterator<Item = FlagSpec>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    /// Add a flag declaration.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicateFlag`] if the name is taken
    /// - [`RegistryError::InvalidFlagName`] if the name is not kebab-case
    /// - [`RegistryError::InvalidDefault`] if the default does not match the
    ///   declared type
    pub fn register(&mut self, spec: FlagSpec) -> Result<(), RegistryError> {
        if !is_kebab_case(&spec.name) {
            return Err(RegistryError::InvalidFlagName { name: spec.name });
        }
        if self.index.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateFlag { name: spec.name });
        }
        if spec.default.kind() != spec.kind {
            return Err(RegistryError::InvalidDefault {
                name: spec.name,
                expected: spec.kind.to_string()
            });
        }

        self.index.insert(spec.name.clone(), self.specs.len());
        self.specs.push(spec);
        Ok(())
    }

    /// Every declaration, in registration order.
    pub fn all(&self) -> &[FlagSpec] {
        &self.specs
    }

    /// # Errors
    ///
    /// [`RegistryError::UnknownFlag`] if `name` was never registered.
    pub fn lookup(&self, name: &str) -> Result<&FlagSpec, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.specs[i])
            .ok_or_else(|| RegistryError::UnknownFlag {
                name: name.to_string()
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
