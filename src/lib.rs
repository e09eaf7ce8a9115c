//! appdump - build parameter extraction for embedded app CI
//!
//! Continuous-integration pipelines building device apps need each app's
//! build parameters (name, version, icon, flags, derivation paths, curves)
//! per build variant, plus the list of apps to build for each device. This
//! crate collects them without building anything.
//!
//! # Core Concepts
//!
//! - **Parameter extraction**: drives `make` or `cargo metadata` inside an
//!   app's build directory and normalizes the result into an
//!   [`AppDescriptor`]
//! - **Device targets**: the table mapping each device model to its Rust and
//!   C SDK target names and flag rules
//! - **Fleet enumeration**: lists the organization's app repositories and
//!   reads their manifests to select apps by name, SDK and device
//!
//! # Example Usage
//!
//! ```no_run
//! use appdump::{Device, MakefileExtractor, SystemRunner};
//! use std::path::Path;
//!
//! let extractor = MakefileExtractor::new(SystemRunner::new(), "make");
//! let descriptor = extractor.describe(Path::new("app-boilerplate"), Some(Device::Stax))?;
//! println!("{}", serde_json::to_string_pretty(&descriptor)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Project Structure
//!
//! - [`params`]: Makefile and cargo metadata extraction
//! - [`device`]: device target table
//! - [`fleet`]: app repository enumeration
//! - [`process`]: external command execution

pub mod cli;
pub mod config;
pub mod device;
pub mod fleet;
pub mod params;
pub mod process;
pub mod util;

pub use config::{AppDumpConfig, ConfigError};
pub use device::Device;
pub use fleet::{select_apps, AppFilter, AppInfo, FleetError, GitHubClient};
pub use params::{
    AppDescriptor, CargoMetadataExtractor, ExtractError, MakefileExtractor, ParamValue,
    ParameterRecord,
};
pub use process::{CommandRunner, Invocation, RunError, SystemRunner};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
