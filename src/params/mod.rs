//! Build parameter extraction
//!
//! Two extraction modes produce the same [`AppDescriptor`]:
//!
//! - [`makefile`]: runs `make listvariants`, then dumps a fixed set of
//!   variables for every variant through a temporary `.mk` fragment and
//!   parses the sentinel-delimited output ([`sentinel`]). The app's Makefile
//!   is also checked against an allow-list of base makefiles
//!   ([`compliance`]).
//! - [`cargo`]: reads the `ledger` section of `cargo metadata` output.

pub mod cargo;
pub mod compliance;
pub mod makefile;
pub mod sentinel;

use crate::process::RunError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

pub use cargo::CargoMetadataExtractor;
pub use compliance::{is_allowed_makefile, ALLOWED_MAKEFILES};
pub use makefile::MakefileExtractor;
pub use sentinel::{ParseError, VariantSet};

pub const PATH_KEY: &str = "path";
pub const APP_FLAGS_KEY: &str = "appFlags";
pub const TARGET_KEY: &str = "TARGET";
pub const DEFAULT_APP_FLAGS: &str = "0x000";

/// A single build parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    /// Multi-valued parameter. `None` entries serialize as `null`.
    List(Vec<Option<String>>),
}

impl ParamValue {
    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::List(values.into_iter().map(|v| Some(v.into())).collect())
    }
}

pub type ParameterRecord = BTreeMap<String, ParamValue>;

/// Normalized description of an app's build parameters, one record per variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    #[serde(rename = "BUILD_DIRECTORY")]
    pub build_directory: PathBuf,
    #[serde(rename = "VARIANT_PARAM")]
    pub variant_param: String,
    #[serde(rename = "VARIANTS")]
    pub variants: BTreeMap<String, ParameterRecord>,
    #[serde(
        rename = "IS_ALLOWED_MAKEFILE",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_allowed_makefile: Option<bool>,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Failed to write temporary build fragment: {0}")]
    Fragment(#[source] io::Error),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid cargo metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("No package with a `ledger` metadata section found")]
    NoLedgerPackage,
    #[error("Missing metadata field `{0}`")]
    MissingField(String),
    #[error("Invalid app flags `{value}`: {source}")]
    InvalidFlags {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Parses app flags written either as `0x`-prefixed hex or as decimal.
pub fn parse_app_flags(value: &str) -> Result<u32, ExtractError> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|source| ExtractError::InvalidFlags {
        value: value.to_string(),
        source,
    })
}

pub fn format_app_flags(flags: u32) -> String {
    format!("0x{:03x}", flags)
}
