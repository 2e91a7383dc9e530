//! # Configuration File Loading
//!
//! Loads a flat key → value mapping from a configuration file.
//!
//! The format is chosen by file extension; a missing or unrecognised
//! extension is an error rather than a guess.
//!
//! | extension | format |
//! |---|---|
//! | `.json` | JSON |
//! | `.yaml`, `.yml` | YAML |
//! | `.toml` | TOML |
//! | `.hcl`, `.tfvars` | HCL |
//! | `.ini` | INI |
//! | `.env` (or a file named `.env`) | `KEY=VALUE` lines |
//! | `.properties`, `.props` | Java properties |
//!
//! Keys are lower-cased. Nested tables and INI sections become dotted keys
//! (`section.key`), which never name a flag and end up ignored. In
//! env-style files `_` in keys becomes `-`, so `LOG_LEVEL=debug` sets
//! `log-level`.

use std::collections::BTreeMap;
use std::path::Path;

use errors::ConfigFileError;
use serde_json::Value;
use strum::Display;
use tracing::debug;

use crate::types::RawValue;

/// Supported configuration file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
    Hcl,
    Ini,
    Env,
    Properties
}

impl ConfigFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "hcl" | "tfvars" => Some(Self::Hcl),
            "ini" => Some(Self::Ini),
            "env" => Some(Self::Env),
            "properties" | "props" => Some(Self::Properties),
            _ => None
        }
    }

    /// Infer the format of `path` from its extension.
    ///
    /// # Errors
    ///
    /// [`ConfigFileError::NoExtension`] or
    /// [`ConfigFileError::UnsupportedFormat`].
    pub fn from_path(path: &Path) -> Result<Self, ConfigFileError> {
        if path.file_name().is_some_and(|name| name == ".env") {
            return Ok(Self::Env);
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigFileError::NoExtension {
                path: path.to_path_buf()
            })?;

        Self::from_extension(extension).ok_or_else(|| ConfigFileError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension.to_string()
        })
    }
}

/// Load the key → value mapping stored in `path`.
///
/// # Errors
///
/// Returns `ConfigFileError` for:
/// - Missing or unsupported extension
/// - File not readable
/// - Parse errors for the detected format
pub fn load_from_file(path: &Path) -> Result<BTreeMap<String, RawValue>, ConfigFileError> {
    let format = ConfigFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source
    })?;

    let values = parse_str(&contents, format, path)?;
    debug!(path = %path.display(), %format, keys = values.len(), "Loaded config file");
    Ok(values)
}

/// Parse `contents` as `format`. `path` is only used for error reporting.
///
/// # Errors
///
/// [`ConfigFileError::Parse`] if the contents are not valid `format`, or if
/// a structured document is not a mapping at the top level.
pub fn parse_str(
    contents: &str,
    format: ConfigFormat,
    path: &Path
) -> Result<BTreeMap<String, RawValue>, ConfigFileError> {
    let parse_error = |reason: &dyn std::fmt::Display| ConfigFileError::parse(path, format, reason);

    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    match format {
        ConfigFormat::Json => {
            let doc: Value = serde_json::from_str(contents).map_err(|e| parse_error(&e))?;
            flatten_document(doc, path, format)
        }
        ConfigFormat::Yaml => {
            let doc: Value = serde_yaml::from_str(contents).map_err(|e| parse_error(&e))?;
            flatten_document(doc, path, format)
        }
        ConfigFormat::Toml => {
            let doc: Value = toml::from_str(contents).map_err(|e| parse_error(&e))?;
            flatten_document(doc, path, format)
        }
        ConfigFormat::Hcl => {
            let doc: Value = hcl::from_str(contents).map_err(|e| parse_error(&e))?;
            flatten_document(doc, path, format)
        }
        ConfigFormat::Ini => {
            let ini = ini::Ini::load_from_str(contents).map_err(|e| parse_error(&e))?;
            let mut values = BTreeMap::new();
            for (section, properties) in &ini {
                for (key, value) in properties.iter() {
                    let key = match section {
                        Some(section) => format!("{section}.{key}"),
                        None => key.to_string()
                    };
                    values.insert(key.to_lowercase(), RawValue::Text(value.to_string()));
                }
            }
            Ok(values)
        }
        ConfigFormat::Env => {
            let mut values = BTreeMap::new();
            let escaped = escape_substitutions(contents);
            for item in dotenvy::from_read_iter(escaped.as_bytes()) {
                let (key, value) = item.map_err(|e| parse_error(&e))?;
                values.insert(key.to_lowercase().replace('_', "-"), RawValue::Text(value));
            }
            Ok(values)
        }
        ConfigFormat::Properties => {
            let properties =
                java_properties::read(contents.as_bytes()).map_err(|e| parse_error(&e))?;
            Ok(properties
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), RawValue::Text(value)))
                .collect())
        }
    }
}

/// Escape every `$` dotenvy would expand, so `${VAR:default}` reaches
/// interpolation intact instead of being resolved against the process
/// environment while reading.
///
/// Single-quoted text is never expanded by dotenvy and stays as is, as do
/// comments and `$` characters that are already escaped.
fn escape_substitutions(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut chars = contents.chars().peekable();
    let mut single_quoted = false;
    let mut double_quoted = false;
    let mut previous = '\n';

    while let Some(c) = chars.next() {
        if single_quoted {
            single_quoted = c != '\'';
            out.push(c);
            previous = c;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
                previous = '\\';
                continue;
            }
            '$' => out.push_str("\\$"),
            '\'' if !double_quoted => {
                single_quoted = true;
                out.push(c);
            }
            '"' => {
                double_quoted = !double_quoted;
                out.push(c);
            }
            '#' if !double_quoted && previous.is_whitespace() => {
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    out.push(next);
                    chars.next();
                }
            }
            _ => out.push(c)
        }
        previous = c;
    }
    out
}

fn flatten_document(
    doc: Value,
    path: &Path,
    format: ConfigFormat
) -> Result<BTreeMap<String, RawValue>, ConfigFileError> {
    let mut values = BTreeMap::new();
    match doc {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_value(&key.to_lowercase(), value, &mut values);
            }
            Ok(values)
        }
        Value::Null => Ok(values),
        other => Err(ConfigFileError::parse(
            path,
            format,
            format!("expected a key/value mapping at the top level, found {}", kind_of(&other))
        ))
    }
}

fn flatten_value(key: &str, value: Value, out: &mut BTreeMap<String, RawValue>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            out.insert(key.to_string(), RawValue::Boolean(b));
        }
        Value::Number(n) => {
            let raw = n
                .as_i64()
                .map(RawValue::Integer)
                .unwrap_or_else(|| RawValue::Text(n.to_string()));
            out.insert(key.to_string(), raw);
        }
        Value::String(s) => {
            out.insert(key.to_string(), RawValue::Text(s));
        }
        Value::Array(_) => {
            out.insert(key.to_string(), RawValue::Text(value.to_string()));
        }
        Value::Object(map) => {
            for (child, value) in map {
                flatten_value(&format!("{key}.{}", child.to_lowercase()), value, out);
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("terralist.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("terralist.TOML")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("/etc/terralist/.env")).unwrap(),
            ConfigFormat::Env
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("app.properties")).unwrap(),
            ConfigFormat::Properties
        );
    }

    #[test]
    fn test_missing_extension_is_an_error() {
        let err = ConfigFormat::from_path(Path::new("/etc/terralist/config")).unwrap_err();
        assert!(matches!(err, ConfigFileError::NoExtension { .. }));
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        let err = ConfigFormat::from_path(Path::new("config.xml")).unwrap_err();
        assert!(
            matches!(err, ConfigFileError::UnsupportedFormat { ref extension, .. } if extension == "xml")
        );
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            "port: 5758\nlog-level: debug\nlocal-development: true\nfoo: bar\n"
        );
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["port"], RawValue::Integer(5758));
        assert_eq!(values["log-level"], text("debug"));
        assert_eq!(values["local-development"], RawValue::Boolean(true));
        assert_eq!(values["foo"], text("bar"));
    }

    #[test]
    fn test_load_json() {
        let file = write_config(".json", r#"{"port": "${PORT:5758}", "ratio": 1.5, "Url": null}"#);
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["port"], text("${PORT:5758}"));
        assert_eq!(values["ratio"], text("1.5"));
        assert!(!values.contains_key("url"));
    }

    #[test]
    fn test_load_toml_with_table() {
        let file = write_config(
            ".toml",
            "database-backend = \"postgresql\"\n\n[server]\nport = 80\n"
        );
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["database-backend"], text("postgresql"));
        assert_eq!(values["server.port"], RawValue::Integer(80));
        assert!(!values.contains_key("port"));
    }

    #[test]
    fn test_load_hcl() {
        let file = write_config(".hcl", "port = 8080\noauth-provider = \"github\"\n");
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["port"], RawValue::Integer(8080));
        assert_eq!(values["oauth-provider"], text("github"));
    }

    #[test]
    fn test_load_ini() {
        let file = write_config(".ini", "port = 8080\n\n[s3]\nbucket = modules\n");
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["port"], text("8080"));
        assert_eq!(values["s3.bucket"], text("modules"));
    }

    #[test]
    fn test_load_env_style() {
        let file = write_config(".env", "# comment\nLOG_LEVEL=warn\nGH_CLIENT_ID='abc'\n");
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["log-level"], text("warn"));
        assert_eq!(values["gh-client-id"], text("abc"));
    }

    #[test]
    fn test_env_style_keeps_interpolation_expressions() {
        let file = write_config(
            ".env",
            concat!(
                "# don't expand while reading\n",
                "PORT=${TERRALIST_TEST_UNSET_VAR:5758}\n",
                "GH_ORGANIZATION=${TERRALIST_TEST_UNSET_VAR}\n",
                "URL=\"${TERRALIST_TEST_UNSET_VAR:http://x}\"\n",
                "SQLITE_PATH='$HOME/terralist.db'\n",
                "S3_BUCKET_NAME=cost\\$5\n",
            )
        );
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["port"], text("${TERRALIST_TEST_UNSET_VAR:5758}"));
        assert_eq!(values["gh-organization"], text("${TERRALIST_TEST_UNSET_VAR}"));
        assert_eq!(values["url"], text("${TERRALIST_TEST_UNSET_VAR:http://x}"));
        assert_eq!(values["sqlite-path"], text("$HOME/terralist.db"));
        assert_eq!(values["s3-bucket-name"], text("cost$5"));
    }

    #[test]
    fn test_escape_substitutions() {
        assert_eq!(escape_substitutions("A=${X:1}"), "A=\\${X:1}");
        assert_eq!(escape_substitutions("A='${X}'"), "A='${X}'");
        assert_eq!(escape_substitutions("A=\"$X\""), "A=\"\\$X\"");
        assert_eq!(escape_substitutions("A=\\$X"), "A=\\$X");
        assert_eq!(escape_substitutions("# it's $X\nB=$Y"), "# it's $X\nB=\\$Y");
    }

    #[test]
    fn test_load_properties() {
        let file = write_config(".properties", "port=9000\nsqlite-path = /var/lib/terralist.db\n");
        let values = load_from_file(file.path()).unwrap();

        assert_eq!(values["port"], text("9000"));
        assert_eq!(values["sqlite-path"], text("/var/lib/terralist.db"));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let file = write_config(".json", "{ not json");
        let err = load_from_file(file.path()).unwrap_err();

        assert!(matches!(err, ConfigFileError::Parse { ref format, .. } if format == "json"));
        assert_eq!(err.path(), file.path());
    }

    #[test]
    fn test_top_level_must_be_a_mapping() {
        let file = write_config(".yaml", "- a\n- b\n");
        let err = load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("a list"));
    }

    #[test]
    fn test_empty_yaml_is_empty_mapping() {
        let file = write_config(".yaml", "");
        assert!(load_from_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_file() {
        let err = load_from_file(Path::new("/nonexistent/terralist.yaml")).unwrap_err();
        assert!(matches!(err, ConfigFileError::Read { .. }));
    }
}
