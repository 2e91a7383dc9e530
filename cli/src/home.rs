//! Home directory handling.
//!
//! The `home` flag is cleaned, a leading `~` is expanded to the user's home
//! directory, the result is made absolute and created if missing.

use std::path::{Component, Path, PathBuf};

use crate::error::StartupError;

fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str())
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Expand a leading `~` against `user_home` and clean the result.
pub fn expand(raw: &str, user_home: Option<&Path>) -> PathBuf {
    let expanded = match (raw.strip_prefix('~'), user_home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(raw)
    };
    clean(&expanded)
}

/// Resolve `raw` to an absolute, existing directory.
pub fn prepare(raw: &str) -> Result<PathBuf, StartupError> {
    let expanded = expand(raw, dirs::home_dir().as_deref());
    let home = std::path::absolute(&expanded).map_err(|source| StartupError::Home {
        path: expanded.clone(),
        source
    })?;

    std::fs::create_dir_all(&home).map_err(|source| StartupError::Home {
        path: home.clone(),
        source
    })?;
    Ok(home)
}
