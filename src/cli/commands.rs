use crate::device::Device;
use crate::fleet::Sdk;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build parameter extraction for embedded app CI
#[derive(Parser, Debug)]
#[command(
    name = "appdump",
    about = "Extract app build parameters and enumerate apps for CI",
    version,
    long_about = "appdump drives an app's build tool (make or cargo) to dump its build \
                  parameters (name, version, icon, flags, curve, path) into a normalized \
                  JSON file, or lists the organization's apps and their target devices."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Dump build parameters of a Makefile-based app",
        long_about = "Runs `make listvariants`, then dumps the build parameters of every \
                      variant and checks the Makefile includes an allow-listed base makefile.\n\n\
                      Examples:\n  \
                      appdump makefile --app-build-path app-boilerplate --json-path params.json\n  \
                      appdump makefile --app-build-path app-exchange --json-path out.json --device stax"
    )]
    Makefile(MakefileArgs),

    #[command(
        about = "Dump build parameters of a Cargo-based app",
        long_about = "Reads the `ledger` section of `cargo metadata` for the given device.\n\n\
                      Examples:\n  \
                      appdump cargo --device nanosp --app-build-path app-boilerplate-rust \
                      --json-path params.json"
    )]
    Cargo(CargoArgs),

    #[command(
        about = "List apps and their target devices as JSON",
        long_about = "Selects applications and dumps relevant workflow data from their \
                      manifests as a JSON array on stdout.\n\n\
                      Examples:\n  \
                      appdump list-apps\n  \
                      appdump list-apps -d nanox stax -s rust\n  \
                      appdump list-apps -o app-bitcoin app-ethereum"
    )]
    ListApps(ListAppsArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct MakefileArgs {
    #[arg(
        long,
        alias = "app_build_path",
        value_name = "DIR",
        help = "App build path, e.g. <app-boilerplate/app>"
    )]
    pub app_build_path: PathBuf,

    #[arg(
        long,
        alias = "json_path",
        value_name = "FILE",
        help = "JSON path to store the output"
    )]
    pub json_path: PathBuf,

    #[arg(
        long,
        value_enum,
        help = "Device model; applies its flag and target rules to every variant"
    )]
    pub device: Option<Device>,
}

#[derive(Parser, Debug, Clone)]
pub struct CargoArgs {
    #[arg(long, value_enum, help = "Device model")]
    pub device: Device,

    #[arg(
        long,
        alias = "app_build_path",
        value_name = "DIR",
        help = "App build path, e.g. <app-boilerplate/app>"
    )]
    pub app_build_path: PathBuf,

    #[arg(
        long,
        alias = "json_path",
        value_name = "FILE",
        help = "JSON path to store the output"
    )]
    pub json_path: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ListAppsArgs {
    #[arg(
        short = 'd',
        long,
        num_args = 1..,
        default_value = "all",
        help = "Devices to filter on: nanos, nanosp, nanos+, nanox, stax, flex or all"
    )]
    pub devices: Vec<String>,

    #[arg(
        short = 'e',
        long,
        num_args = 1..,
        help = "Applications to exclude from the list"
    )]
    pub exclude: Vec<String>,

    #[arg(
        short = 'o',
        long,
        num_args = 1..,
        help = "Applications to select. Takes precedence over --exclude"
    )]
    pub only: Vec<String>,

    #[arg(
        short = 'l',
        long,
        default_value = "0",
        help = "Limit the number of applications to collect (0 for no limit)"
    )]
    pub limit: usize,

    #[arg(
        short = 's',
        long,
        value_enum,
        default_value = "all",
        help = "SDK to filter on"
    )]
    pub sdk: SdkArg,

    #[arg(
        short = 't',
        long,
        alias = "github_token",
        value_name = "TOKEN",
        help = "A GitHub token to avoid API rate limits (defaults to GITHUB_TOKEN)"
    )]
    pub github_token: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkArg {
    #[value(name = "c", alias = "C")]
    C,
    #[value(name = "rust", alias = "Rust")]
    Rust,
    All,
}

impl SdkArg {
    pub fn sdks(self) -> Vec<Sdk> {
        match self {
            SdkArg::C => vec![Sdk::C],
            SdkArg::Rust => vec![Sdk::Rust],
            SdkArg::All => vec![Sdk::C, Sdk::Rust],
        }
    }
}
