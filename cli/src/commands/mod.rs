pub mod server;
pub mod version;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use config::{FlagKind, FlagRegistry, FlagSpec};

/// Root `terralist` command. Flags of the `server` subcommand are generated
/// from `registry`, one `--<name>` per flag.
pub fn build(registry: &FlagRegistry) -> Command {
    Command::new("terralist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terralist - a private Terraform registry")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("server")
                .about("Starts the Terralist server")
                .long_about("Starts the Terralist RESTful server.")
                .args(registry.all().iter().map(flag_arg))
        )
        .subcommand(Command::new("version").about("Prints the Terralist version"))
}

fn flag_arg(spec: &FlagSpec) -> Arg {
    let arg = Arg::new(spec.name().to_string())
        .long(spec.name().to_string())
        .help(spec.usage())
        .hide(spec.is_hidden())
        .action(ArgAction::Set);

    match spec.kind() {
        FlagKind::String => arg.value_name("STRING"),
        FlagKind::Integer => arg.value_name("INT").allow_negative_numbers(true),
        // `--debug` alone means true; an explicit value needs `=`.
        FlagKind::Boolean => arg
            .value_name("BOOL")
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
    }
}

/// Whether a clap error is really a request for help or version output.
pub fn is_informational(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}
