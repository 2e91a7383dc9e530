//! # Configuration Precedence
//!
//! Merges flag values from every source into one [`RawValueSet`].
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)
//!
//! Only flags passed explicitly on the command line take part in the CLI
//! layer, so passing a flag's default value on purpose still overrides a
//! file or environment entry.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::registry::FlagRegistry;
use crate::types::{CliValues, RawEntry, RawValue, RawValueSet, ValueSource};

/// Attach file provenance to the values loaded from `path`, dropping keys
/// that do not name a registered flag.
pub fn file_entries(
    registry: &FlagRegistry,
    path: &Path,
    values: BTreeMap<String, RawValue>
) -> BTreeMap<String, RawEntry> {
    let mut entries = BTreeMap::new();
    for (key, value) in values {
        if !registry.contains(&key) {
            warn!(path = %path.display(), key = %key, "Ignoring unknown config file key");
            continue;
        }
        entries.insert(
            key,
            RawEntry::new(value, ValueSource::ConfigFile(path.to_path_buf()))
        );
    }
    entries
}

/// Merge all sources into one raw value set.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Starts from every flag's declared default, then overlays the config
/// file, the environment and the explicitly passed command-line values, in
/// that order. Later layers replace earlier ones per flag.
///
/// ## Usage
/// ```rust
/// use config::{CliValues, FlagRegistry, FlagSpec, merge_configs};
/// use std::collections::BTreeMap;
///
/// let registry = FlagRegistry::from_specs([
///     FlagSpec::integer("port").default_value(5758),
/// ]).unwrap();
/// let cli = CliValues::new().with("port", "8080");
///
/// let merged = merge_configs(&registry, BTreeMap::new(), BTreeMap::new(), &cli);
/// assert_eq!(merged.get("port").unwrap().value.to_string(), "8080");
/// ```
///
/// ## Result
/// Every registered flag has exactly one entry; nothing else does.
pub fn merge_configs(
    registry: &FlagRegistry,
    file: BTreeMap<String, RawEntry>,
    env: BTreeMap<String, RawEntry>,
    cli: &CliValues
) -> RawValueSet {
    let mut merged = RawValueSet::new();
    for spec in registry.all() {
        merged.insert(
            spec.name(),
            RawEntry::new(spec.default().clone().into(), ValueSource::Default)
        );
    }

    merge_with_logging(registry, &mut merged, file, "file");
    merge_with_logging(registry, &mut merged, env, "env");

    let mut explicit = BTreeMap::new();
    for (name, value) in cli.iter() {
        if !registry.contains(name) {
            warn!(flag = name, "Ignoring unknown command-line flag");
            continue;
        }
        explicit.insert(
            name.to_string(),
            RawEntry::new(RawValue::from(value), ValueSource::CommandLine)
        );
    }
    merge_with_logging(registry, &mut merged, explicit, "cli");

    merged
}

fn merge_with_logging(
    registry: &FlagRegistry,
    base: &mut RawValueSet,
    layer: BTreeMap<String, RawEntry>,
    source_name: &str
) {
    let mut changes = Vec::new();

    for (name, entry) in layer {
        let Ok(spec) = registry.lookup(&name) else {
            continue;
        };
        if spec.is_sensitive() {
            changes.push(format!("{name} = ***"));
        } else {
            changes.push(format!("{name} = {}", entry.value));
        }
        base.insert(name, entry);
    }

    if !changes.is_empty() {
        debug!("Configuration from {}: {:?}", source_name, changes);
    }
}
