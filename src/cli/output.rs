//! JSON output for descriptors and app listings
//!
//! Descriptor files are written 4-space indented; `list-apps` prints a
//! single compact line so CI steps can capture it as a matrix value.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 4-space indented JSON
    Pretty,
    /// Single-line JSON
    Compact,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        match self.format {
            OutputFormat::Pretty => self.format_pretty(value),
            OutputFormat::Compact => {
                serde_json::to_string(value).context("Failed to serialize output to JSON")
            }
        }
    }

    fn format_pretty<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        value
            .serialize(&mut serializer)
            .context("Failed to serialize output to JSON")?;
        String::from_utf8(buf).context("Serialized JSON is not valid UTF-8")
    }

    /// Writes the formatted value to `path`, replacing any existing file.
    pub fn write_to<T: Serialize + ?Sized>(&self, value: &T, path: &Path) -> Result<()> {
        let content = self.format(value)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write output to {}", path.display()))
    }
}
