//! `terralist server`: resolve the configuration, select the backends and
//! hand them to the server.

use clap::ArgMatches;
use clap::parser::ValueSource as ClapSource;
use config::flags;
use config::{CliValues, ConfigResolver, Environment, FlagRegistry, ResolvedConfig};
use tl_core::BackendCategory;
use tracing::info;

use crate::error::StartupError;
use crate::home;
use crate::logging::LogHandle;
use crate::server::{Dependencies, ServerCreator, UserConfig};

/// Values the user passed explicitly. A flag left at its default is absent
/// even if the user could have typed the same value.
pub fn explicit_values(matches: &ArgMatches, registry: &FlagRegistry) -> CliValues {
    let mut cli = CliValues::new();
    for spec in registry.all() {
        if matches.value_source(spec.name()) != Some(ClapSource::CommandLine) {
            continue;
        }
        if let Some(value) = matches.get_one::<String>(spec.name()) {
            cli.insert(spec.name(), value.as_str());
        }
    }
    cli
}

/// Resolve the configuration from every source.
pub fn resolve(
    registry: &FlagRegistry,
    cli: CliValues,
    env: Option<&dyn Environment>
) -> Result<ResolvedConfig, StartupError> {
    let mut resolver = ConfigResolver::new(registry).with_cli(cli);
    if let Some(env) = env {
        resolver = resolver.with_env(env);
    }
    Ok(resolver.resolve()?)
}

fn text(config: &ResolvedConfig, name: &str) -> String {
    config.get_str(name).unwrap_or_default().to_string()
}

pub fn user_config(config: &ResolvedConfig) -> Result<UserConfig, StartupError> {
    let port = config.get_int(flags::PORT).unwrap_or(5758);
    Ok(UserConfig {
        log_level: text(config, flags::LOG_LEVEL),
        port: u16::try_from(port).map_err(|_| StartupError::Usage(format!("invalid port {port}")))?,
        url: text(config, flags::URL),
        token_signing_secret: text(config, flags::TOKEN_SIGNING_SECRET)
    })
}

/// Select and construct one backend per category.
///
/// Categories are dispatched in a fixed order (database, auth, home
/// directory, module storage, provider storage); the first failure aborts.
pub fn dependencies(config: &ResolvedConfig) -> Result<Dependencies, StartupError> {
    let database = storage::database::registry()?.build(
        &text(config, flags::DATABASE_BACKEND),
        &storage::DatabaseSettings::from_config(config)
    )?;

    let auth = auth::registry()?.build(
        &text(config, flags::OAUTH_PROVIDER),
        &auth::AuthSettings::from_config(config)
    )?;

    let home = home::prepare(&text(config, flags::HOME))?;
    info!(home = %home.display(), "Home directory ready");
    let storage_settings = storage::StorageSettings::from_config(config, home);

    let modules_storage = storage::resolver::registry(BackendCategory::ModulesStorage)?.build(
        &text(config, BackendCategory::ModulesStorage.discriminant_flag()),
        &storage_settings
    )?;
    let providers_storage = storage::resolver::registry(BackendCategory::ProvidersStorage)?.build(
        &text(config, BackendCategory::ProvidersStorage.discriminant_flag()),
        &storage_settings
    )?;

    Ok(Dependencies {
        database,
        auth,
        modules_storage,
        providers_storage,
        debug: config.get_bool(flags::DEBUG).unwrap_or(false)
    })
}

pub async fn run(
    matches: &ArgMatches,
    registry: &FlagRegistry,
    log: &LogHandle,
    creator: &dyn ServerCreator
) -> Result<(), StartupError> {
    let config = resolve(registry, explicit_values(matches, registry), None)?;
    log.apply(
        config.get_str(flags::LOG_LEVEL).unwrap_or("info"),
        config.get_bool(flags::DEBUG).unwrap_or(false)
    );

    let user = user_config(&config)?;
    let deps = dependencies(&config)?;
    let server = creator.new_server(user, deps)?;
    server.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands;
    use config::terralist_registry;
    use errors::{BackendError, ConfigError};
    use std::collections::HashMap;

    fn matches(registry: &FlagRegistry, args: &[&str]) -> ArgMatches {
        let mut argv = vec!["terralist", "server"];
        argv.extend_from_slice(args);
        let root = commands::build(registry).try_get_matches_from(argv).unwrap();
        root.subcommand_matches("server").unwrap().clone()
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_only_explicit_flags_are_collected() {
        let registry = terralist_registry().unwrap();
        let matches = matches(&registry, &["--port", "5758", "--debug"]);
        let cli = explicit_values(&matches, &registry);

        assert_eq!(cli.get("port"), Some("5758"));
        assert_eq!(cli.get("debug"), Some("true"));
        assert_eq!(cli.get("log-level"), None);
    }

    #[test]
    fn test_boolean_with_explicit_value() {
        let registry = terralist_registry().unwrap();
        let matches = matches(&registry, &["--debug=false"]);
        assert_eq!(explicit_values(&matches, &registry).get("debug"), Some("false"));
    }

    #[test]
    fn test_flag_beats_environment() {
        let registry = terralist_registry().unwrap();
        let env = env(&[
            ("TERRALIST_PORT", "9000"),
            ("TERRALIST_TOKEN_SIGNING_SECRET", "s"),
            ("TERRALIST_OAUTH_PROVIDER", "github"),
        ]);
        let matches = matches(&registry, &["--port", "5758"]);

        let config = resolve(&registry, explicit_values(&matches, &registry), Some(&env)).unwrap();
        assert_eq!(config.get_int("port"), Some(5758));
    }

    #[test]
    fn test_missing_required_flags_are_all_reported() {
        let registry = terralist_registry().unwrap();
        let err = resolve(&registry, CliValues::new(), Some(&env(&[]))).unwrap_err();

        let StartupError::Config(ConfigError::Validation(validation)) = err else {
            panic!("expected a validation error");
        };
        assert_eq!(validation.flags(), vec!["token-signing-secret", "oauth-provider"]);
    }

    #[test]
    fn test_unsupported_database_stops_startup() {
        let registry = terralist_registry().unwrap();
        let cli = CliValues::new()
            .with("token-signing-secret", "s")
            .with("oauth-provider", "github")
            .with("database-backend", "mysql");
        let config = resolve(&registry, cli, Some(&env(&[]))).unwrap();

        let err = dependencies(&config).unwrap_err();
        assert!(matches!(
            err,
            StartupError::Backend(BackendError::Unsupported { ref category, ref value, .. })
                if category == "database" && value == "mysql"
        ));
    }

    #[test]
    fn test_dependencies_assembled() {
        let registry = terralist_registry().unwrap();
        let home = tempfile::tempdir().unwrap();
        let db = home.path().join("terralist.db");
        let cli = CliValues::new()
            .with("token-signing-secret", "s")
            .with("oauth-provider", "github")
            .with("gh-client-id", "id")
            .with("gh-client-secret", "secret")
            .with("sqlite-path", &db.to_string_lossy())
            .with("home", &home.path().to_string_lossy())
            .with("modules-storage-resolver", "s3")
            .with("s3-bucket-name", "modules")
            .with("s3-bucket-region", "us-east-1");
        let config = resolve(&registry, cli, Some(&env(&[]))).unwrap();

        let deps = dependencies(&config).unwrap();
        assert_eq!(deps.database.backend(), "sqlite");
        assert_eq!(deps.auth.name(), "github");
        assert_eq!(deps.modules_storage.name(), "s3");
        assert_eq!(deps.providers_storage.name(), "proxy");
        assert!(!deps.debug);

        let user = user_config(&config).unwrap();
        assert_eq!(user.port, 5758);
        assert_eq!(user.log_level, "info");
    }
}
