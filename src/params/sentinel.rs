//! Parsing of `make` output produced by the `listvariants` and `listparams`
//! targets.
//!
//! Both targets print plain `echo` lines, possibly preceded by unrelated make
//! logs. `listvariants` prints `VARIANTS <selector> <variant>...` and the
//! dump target prints `KEY=value` lines framed by [`DUMP_START`] and
//! [`DUMP_STOP`]. Nothing here touches processes or files.

use super::{ParamValue, ParameterRecord, APP_FLAGS_KEY, DEFAULT_APP_FLAGS, PATH_KEY};
use thiserror::Error;

pub const VARIANTS_MARKER: &str = "VARIANTS";
pub const DUMP_START: &str = "Start dumping params";
pub const DUMP_STOP: &str = "Stop dumping params";

/// Kept verbatim: its value is itself a space-separated list of sub-flags
pub const LOAD_PARAMS_KEY: &str = "APP_LOAD_PARAMS";

/// Keys whose values are exposed as lists
pub const MULTI_VALUED_KEYS: [&str; 4] = ["curve", "path", "tlvraw", "dep"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid variants retrieved: {0}")]
    InvalidVariants(String),
    #[error("At least one variant should be defined in the app Makefile")]
    NoVariants,
    #[error("Marker `{marker}` not found in build output:\n{output}")]
    MissingMarker { marker: &'static str, output: String },
}

/// Variants declared by an app, and the make variable selecting between them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSet {
    pub selector: String,
    pub variants: Vec<String>,
}

impl VariantSet {
    /// `SELECTOR=variant` assignment passed on the make command line
    pub fn assignment(&self, variant: &str) -> String {
        format!("{}={}", self.selector, variant)
    }
}

pub fn parse_variants(output: &str) -> Result<VariantSet, ParseError> {
    if !output.contains(VARIANTS_MARKER) {
        return Err(ParseError::InvalidVariants(output.to_string()));
    }

    // Drop make logs printed before the listvariants output
    let marker = format!("{} ", VARIANTS_MARKER);
    let (_, tail) = output
        .split_once(marker.as_str())
        .ok_or_else(|| ParseError::InvalidVariants(output.to_string()))?;
    let line = tail.split('\n').next().unwrap_or_default();

    let mut tokens = line.split(' ').map(str::to_string);
    let selector = tokens.next().unwrap_or_default();
    let variants: Vec<String> = tokens.collect();

    if variants.is_empty() {
        return Err(ParseError::NoVariants);
    }

    Ok(VariantSet { selector, variants })
}

/// Extracts the parameter record from `listparams` output.
///
/// Lines without `=` are ignored, as are keys with an empty value.
/// `path` and `appFlags` are always present in the result.
pub fn parse_dump(output: &str) -> Result<ParameterRecord, ParseError> {
    let block = dump_block(output)?;

    let mut record = ParameterRecord::new();
    for line in block.split('\n') {
        if !line.contains('=') {
            continue;
        }

        if let Some(load_params) = line
            .strip_prefix(LOAD_PARAMS_KEY)
            .and_then(|r| r.strip_prefix('='))
        {
            record.insert(LOAD_PARAMS_KEY.to_string(), ParamValue::text(load_params));
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        let value = if MULTI_VALUED_KEYS.contains(&key) {
            ParamValue::list(value.trim().split(' '))
        } else {
            ParamValue::text(value)
        };
        record.insert(key.to_string(), value);
    }

    apply_defaults(&mut record);
    Ok(record)
}

pub fn apply_defaults(record: &mut ParameterRecord) {
    record
        .entry(PATH_KEY.to_string())
        .or_insert_with(|| ParamValue::List(vec![None]));
    record
        .entry(APP_FLAGS_KEY.to_string())
        .or_insert_with(|| ParamValue::text(DEFAULT_APP_FLAGS));
}

fn dump_block(output: &str) -> Result<&str, ParseError> {
    let start = format!("{}\n", DUMP_START);
    let (_, tail) = output
        .split_once(start.as_str())
        .ok_or_else(|| ParseError::MissingMarker {
            marker: DUMP_START,
            output: output.to_string(),
        })?;

    // Nothing was echoed between the two sentinels
    if tail.starts_with(DUMP_STOP) {
        return Ok("");
    }

    let stop = format!("\n{}", DUMP_STOP);
    tail.split_once(stop.as_str())
        .map(|(block, _)| block)
        .ok_or_else(|| ParseError::MissingMarker {
            marker: DUMP_STOP,
            output: output.to_string(),
        })
}
