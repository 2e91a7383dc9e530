use std::process::ExitCode;

use clap::error::ErrorKind;
use config::terralist_registry;
use tracing::{Level, enabled, error};

mod commands;
mod error;
mod home;
mod logging;
mod server;

use error::StartupError;
use server::DefaultCreator;

#[tokio::main]
async fn main() -> ExitCode {
    let log = logging::init();

    match run(&log).await {
        Ok(code) => code,
        Err(e) => {
            if enabled!(Level::ERROR) {
                error!(error = %e, "Terralist failed to start");
            } else {
                // RUST_LOG filtered the error level out
                eprintln!("error: Terralist failed to start: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(log: &logging::LogHandle) -> Result<ExitCode, StartupError> {
    let registry = terralist_registry()?;

    let matches = match commands::build(&registry).try_get_matches() {
        Ok(matches) => matches,
        Err(e) if commands::is_informational(e.kind()) => {
            let _ = e.print();
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) if e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            return Err(StartupError::Usage(
                "a subcommand is required, see 'terralist --help'".to_string()
            ));
        }
        Err(e) => {
            let rendered = e.to_string();
            let line = rendered.lines().next().unwrap_or_default();
            return Err(StartupError::Usage(
                line.trim_start_matches("error: ").to_string()
            ));
        }
    };

    match matches.subcommand() {
        Some(("server", sub)) => {
            commands::server::run(sub, &registry, log, &DefaultCreator).await?;
        }
        Some(("version", _)) => commands::version::run(),
        _ => {}
    }
    Ok(ExitCode::SUCCESS)
}
