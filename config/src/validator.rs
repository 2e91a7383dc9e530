//! # Configuration Validation
//!
//! Coerces merged raw values into their declared types and checks per-flag
//! rules, producing the immutable [`ResolvedConfig`].
//!
//! Every flag is checked; all violations are collected and reported
//! together in one [`ValidationError`].

use std::collections::{BTreeMap, BTreeSet};

use errors::{ValidationError, Violation, ViolationKind};
use validator::ValidateRange;

use crate::registry::{FlagRegistry, FlagSpec, Rule};
use crate::types::{
    FlagKind, FlagValue, RawEntry, RawValue, RawValueSet, ResolvedConfig, ResolvedValue, ValueSource
};

/// Parse a boolean token. Accepts `true`/`false` and the usual aliases,
/// case-insensitively.
pub fn parse_bool(token: &str) -> Option<bool> {
    match token.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None
    }
}

/// Parse a base-10 integer with an optional sign. Separators such as `_`
/// or `,` are rejected.
pub fn parse_int(token: &str) -> Option<i64> {
    token.trim().parse::<i64>().ok()
}

/// Convert `raw` into `kind`.
///
/// # Errors
///
/// [`ViolationKind::TypeMismatch`] when the value cannot represent `kind`.
pub fn coerce(raw: &RawValue, kind: FlagKind) -> Result<FlagValue, ViolationKind> {
    let mismatch = || ViolationKind::TypeMismatch {
        expected: kind.to_string(),
        found: raw.to_string()
    };

    match (kind, raw) {
        (FlagKind::String, raw) => Ok(FlagValue::String(raw.to_string())),
        (FlagKind::Integer, RawValue::Integer(i)) => Ok(FlagValue::Integer(*i)),
        (FlagKind::Integer, RawValue::Text(s)) => parse_int(s).map(FlagValue::Integer).ok_or_else(mismatch),
        (FlagKind::Integer, RawValue::Boolean(_)) => Err(mismatch()),
        (FlagKind::Boolean, RawValue::Boolean(b)) => Ok(FlagValue::Boolean(*b)),
        (FlagKind::Boolean, RawValue::Integer(0)) => Ok(FlagValue::Boolean(false)),
        (FlagKind::Boolean, RawValue::Integer(1)) => Ok(FlagValue::Boolean(true)),
        (FlagKind::Boolean, RawValue::Integer(_)) => Err(mismatch()),
        (FlagKind::Boolean, RawValue::Text(s)) => parse_bool(s).map(FlagValue::Boolean).ok_or_else(mismatch)
    }
}

fn is_missing(spec: &FlagSpec, value: &FlagValue, source: &ValueSource) -> bool {
    spec.is_required()
        && match value {
            FlagValue::String(s) => s.is_empty(),
            FlagValue::Integer(_) | FlagValue::Boolean(_) => *source == ValueSource::Default
        }
}

fn check_rule(spec: &FlagSpec, value: &FlagValue) -> Option<ViolationKind> {
    match (spec.rule()?, value) {
        (Rule::Range { min, max }, FlagValue::Integer(v)) => {
            if v.validate_range(Some(*min), Some(*max), None, None) {
                None
            } else {
                Some(ViolationKind::OutOfRange {
                    min: *min,
                    max: *max,
                    value: *v
                })
            }
        }
        (Rule::OneOf(allowed), FlagValue::String(s)) => {
            // An unset optional flag is not subject to its value list.
            if (s.is_empty() && !spec.is_required()) || allowed.iter().any(|a| a == s) {
                None
            } else {
                Some(ViolationKind::NotAllowed {
                    value: s.clone(),
                    allowed: allowed.clone()
                })
            }
        }
        _ => None
    }
}

fn resolve_flag(spec: &FlagSpec, entry: Option<&RawEntry>) -> Result<ResolvedValue, ViolationKind> {
    let (value, source) = match entry {
        Some(entry) => (coerce(&entry.value, spec.kind())?, entry.source.clone()),
        None => (spec.default().clone(), ValueSource::Default)
    };

    if is_missing(spec, &value, &source) {
        return Err(ViolationKind::Missing);
    }
    if let Some(violation) = check_rule(spec, &value) {
        return Err(violation);
    }

    Ok(ResolvedValue::new(value, source))
}

/// Coerce and validate every registered flag.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Turns the merged, interpolated raw values into a [`ResolvedConfig`].
/// A flag absent from `raw` takes its declared default.
///
/// ## Validation Rules
/// - Integers: base-10, optional sign, no separators
/// - Booleans: `true`/`false`, `1`/`0`, `t`/`f`, `yes`/`no`, `y`/`n`,
///   `on`/`off` (case-insensitive); config-file integers `0` and `1`
/// - Required strings must be non-empty; required integers and booleans
///   must come from some source other than the default
/// - [`Rule::Range`] bounds are inclusive
/// - [`Rule::OneOf`] does not apply to an empty optional string
///
/// ## Errors
/// A [`ValidationError`] listing every violation, in registry order.
/// Resolution is pure: the same input always yields the same output.
pub fn resolve(registry: &FlagRegistry, raw: &RawValueSet) -> Result<ResolvedConfig, ValidationError> {
    let mut values = BTreeMap::new();
    let mut sensitive = BTreeSet::new();
    let mut violations = Vec::new();

    for spec in registry.all() {
        if spec.is_sensitive() {
            sensitive.insert(spec.name().to_string());
        }
        match resolve_flag(spec, raw.get(spec.name())) {
            Ok(value) => {
                values.insert(spec.name().to_string(), value);
            }
            Err(kind) => violations.push(Violation::new(spec.name(), kind))
        }
    }

    if violations.is_empty() {
        Ok(ResolvedConfig::new(values, sensitive))
    } else {
        Err(ValidationError::new(violations))
    }
}
