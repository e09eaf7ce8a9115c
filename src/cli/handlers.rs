//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 on any
//! failure. Failures are logged before returning.

use crate::cli::commands::{CargoArgs, ListAppsArgs, MakefileArgs};
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::config::AppDumpConfig;
use crate::fleet::{resolve_devices, select_apps, AppFilter, GitHubClient};
use crate::params::{CargoMetadataExtractor, MakefileExtractor};
use crate::process::SystemRunner;
use anyhow::{Context, Result};
use tracing::{error, info};

pub fn handle_makefile(args: &MakefileArgs, config: &AppDumpConfig) -> i32 {
    exit_code(run_makefile(args, config))
}

pub fn handle_cargo(args: &CargoArgs, config: &AppDumpConfig) -> i32 {
    exit_code(run_cargo(args, config))
}

pub fn handle_list_apps(args: &ListAppsArgs, config: &AppDumpConfig) -> i32 {
    exit_code(run_list_apps(args, config))
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn run_makefile(args: &MakefileArgs, config: &AppDumpConfig) -> Result<()> {
    info!(
        build_dir = %args.app_build_path.display(),
        "Dumping Makefile build parameters"
    );

    let extractor = MakefileExtractor::new(SystemRunner::new(), &config.make_program);
    let descriptor = extractor
        .describe(&args.app_build_path, args.device)
        .with_context(|| {
            format!(
                "Failed to extract parameters from {}",
                args.app_build_path.display()
            )
        })?;

    OutputFormatter::new(OutputFormat::Pretty).write_to(&descriptor, &args.json_path)?;
    info!(json_path = %args.json_path.display(), "Parameters written");
    Ok(())
}

fn run_cargo(args: &CargoArgs, config: &AppDumpConfig) -> Result<()> {
    info!(
        build_dir = %args.app_build_path.display(),
        device = %args.device,
        "Dumping cargo metadata build parameters"
    );

    let extractor = CargoMetadataExtractor::new(
        SystemRunner::new(),
        &config.cargo_program,
        config.cargo_toolchain.clone(),
    );
    let descriptor = extractor
        .describe(&args.app_build_path, args.device)
        .with_context(|| {
            format!(
                "Failed to extract cargo metadata from {}",
                args.app_build_path.display()
            )
        })?;

    OutputFormatter::new(OutputFormat::Pretty).write_to(&descriptor, &args.json_path)?;
    info!(json_path = %args.json_path.display(), "Parameters written");
    Ok(())
}

fn run_list_apps(args: &ListAppsArgs, config: &AppDumpConfig) -> Result<()> {
    let filter = AppFilter::new(
        resolve_devices(&args.devices),
        &args.only,
        &args.exclude,
        args.limit,
        args.sdk.sdks(),
    );

    let client = GitHubClient::new(config, config.token_or(args.github_token.as_deref()))
        .context("Failed to create GitHub client")?;
    let apps = select_apps(&client, &filter, client.org()).context("Failed to list apps")?;
    info!(count = apps.len(), "Apps selected");

    println!("{}", OutputFormatter::new(OutputFormat::Compact).format(&apps)?);
    Ok(())
}
