//! Parameter extraction from `cargo metadata`
//!
//! Rust apps declare their build parameters in a `[package.metadata.ledger]`
//! table, so no dump protocol is needed: the metadata JSON already carries
//! everything. The descriptor has a single variant named after the package.

use super::{
    format_app_flags, parse_app_flags, AppDescriptor, ExtractError, ParamValue, ParameterRecord,
    APP_FLAGS_KEY, PATH_KEY, TARGET_KEY,
};
use crate::device::Device;
use crate::process::{CommandRunner, Invocation};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const LEDGER_METADATA_KEY: &str = "ledger";

/// Selector name used when an app has no build variants
pub const NO_VARIANT_PARAM: &str = "NONE";

/// Glyph location expected by downstream icon checks
pub const GLYPH_FILES_PLACEHOLDER: &str = "/opt/nanos-secure-sdk/fake_glyph";

#[derive(Debug, Deserialize)]
struct CargoMetadata {
    #[serde(default)]
    packages: Vec<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
    version: String,
    #[serde(default)]
    metadata: Option<Value>,
}

impl Package {
    fn ledger(&self) -> Option<&Map<String, Value>> {
        self.metadata
            .as_ref()?
            .get(LEDGER_METADATA_KEY)?
            .as_object()
    }
}

pub struct CargoMetadataExtractor<R: CommandRunner> {
    runner: R,
    cargo: String,
    toolchain: Option<String>,
}

impl<R: CommandRunner> CargoMetadataExtractor<R> {
    pub fn new(runner: R, cargo: impl Into<String>, toolchain: Option<String>) -> Self {
        Self {
            runner,
            cargo: cargo.into(),
            toolchain,
        }
    }

    fn metadata_invocation(&self, build_dir: &Path) -> Invocation {
        let mut invocation = Invocation::new(&self.cargo, build_dir);
        if let Some(toolchain) = &self.toolchain {
            invocation = invocation.arg(format!("+{}", toolchain));
        }
        invocation.args([
            "metadata",
            "--no-deps",
            "--format-version",
            "1",
            "--offline",
            "-q",
        ])
    }

    pub fn describe(
        &self,
        build_dir: &Path,
        device: Device,
    ) -> Result<AppDescriptor, ExtractError> {
        let output = self.runner.run(&self.metadata_invocation(build_dir))?;
        describe_metadata(build_dir, device, &output)
    }
}

/// Builds the descriptor from raw `cargo metadata` JSON.
pub fn describe_metadata(
    build_dir: &Path,
    device: Device,
    metadata_json: &str,
) -> Result<AppDescriptor, ExtractError> {
    let metadata: CargoMetadata = serde_json::from_str(metadata_json)?;

    let (package, ledger) = metadata
        .packages
        .iter()
        .find_map(|pkg| pkg.ledger().map(|ledger| (pkg, ledger)))
        .ok_or(ExtractError::NoLedgerPackage)?;
    debug!(package = %package.name, %device, "Found ledger metadata");

    let rust_target = device.rust_target();
    let icon = ledger
        .get(rust_target)
        .and_then(|t| t.get("icon"))
        .and_then(Value::as_str)
        .ok_or_else(|| ExtractError::MissingField(format!("ledger.{}.icon", rust_target)))?;

    let app_flags = device.adjust_app_flags(parse_flags_value(required(ledger, "flags")?)?);

    let mut record = ParameterRecord::new();
    record.insert(APP_FLAGS_KEY.to_string(), ParamValue::text(format_app_flags(app_flags)));
    record.insert("curve".to_string(), to_param(required(ledger, "curve")?));
    record.insert(PATH_KEY.to_string(), to_param(required(ledger, "path")?));
    record.insert("GLYPH_FILES".to_string(), ParamValue::text(GLYPH_FILES_PLACEHOLDER));
    record.insert("ICONNAME".to_string(), ParamValue::text(icon));
    record.insert(TARGET_KEY.to_string(), ParamValue::text(device.c_target()));
    record.insert("APPNAME".to_string(), to_param(required(ledger, "name")?));
    record.insert("APPVERSION".to_string(), ParamValue::text(&package.version));

    let mut variants = BTreeMap::new();
    variants.insert(package.name.clone(), record);

    Ok(AppDescriptor {
        build_directory: build_dir.to_path_buf(),
        variant_param: NO_VARIANT_PARAM.to_string(),
        variants,
        is_allowed_makefile: None,
    })
}

fn required<'a>(ledger: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ExtractError> {
    ledger
        .get(key)
        .ok_or_else(|| ExtractError::MissingField(format!("{}.{}", LEDGER_METADATA_KEY, key)))
}

fn parse_flags_value(value: &Value) -> Result<u32, ExtractError> {
    match value {
        Value::String(s) => parse_app_flags(s),
        Value::Number(n) => parse_app_flags(&n.to_string()),
        other => parse_app_flags(&other.to_string()),
    }
}

fn to_param(value: &Value) -> ParamValue {
    match value {
        Value::String(s) => ParamValue::text(s.as_str()),
        Value::Array(items) => ParamValue::List(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        other => ParamValue::text(other.to_string()),
    }
}
