pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CargoArgs, CliArgs, Commands, ListAppsArgs, MakefileArgs, SdkArg};
pub use output::{OutputFormat, OutputFormatter};
