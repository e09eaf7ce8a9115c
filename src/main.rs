use appdump::cli::commands::{CliArgs, Commands};
use appdump::cli::handlers::{handle_cargo, handle_list_apps, handle_makefile};
use appdump::util::{init_logging, LoggingConfig};
use appdump::{AppDumpConfig, VERSION};

use clap::Parser;
use tracing::{debug, error};

fn main() {
    let args = CliArgs::parse();
    let config = AppDumpConfig::default();

    init_logging(LoggingConfig::from_cli(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
        &config.log_level,
    ));

    debug!("appdump v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }
    debug!("{}", config);

    let exit_code = match &args.command {
        Commands::Makefile(makefile_args) => handle_makefile(makefile_args, &config),
        Commands::Cargo(cargo_args) => handle_cargo(cargo_args, &config),
        Commands::ListApps(list_args) => handle_list_apps(list_args, &config),
    };

    std::process::exit(exit_code);
}
