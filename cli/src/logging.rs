//! Process-wide `tracing` setup.
//!
//! The subscriber is installed before any flag is parsed so that the
//! resolution pipeline itself can log. Its filter starts from `RUST_LOG`
//! (or `info`) and is swapped for the resolved `log-level` once the
//! configuration is known, unless `RUST_LOG` was set explicitly.

use tracing::debug;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

const DEFAULT_DIRECTIVE: &str = "info";

/// Handle to the installed filter.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    env_override: bool
}

pub fn init() -> LogHandle {
    let env_override = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    LogHandle {
        filter: handle,
        env_override
    }
}

/// Filter directive for the resolved settings. The hidden `debug` flag
/// forces `trace`.
pub fn directive(log_level: &str, debug: bool) -> &str {
    if debug { "trace" } else { log_level }
}

impl LogHandle {
    /// Switch to the resolved log level.
    pub fn apply(&self, log_level: &str, debug: bool) {
        if self.env_override {
            debug!("RUST_LOG is set, ignoring log-level");
            return;
        }
        let directive = directive(log_level, debug);
        if let Err(e) = self.filter.reload(EnvFilter::new(directive)) {
            tracing::warn!(error = %e, "Could not apply log level");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_forces_trace() {
        assert_eq!(directive("warn", true), "trace");
        assert_eq!(directive("warn", false), "warn");
    }
}
