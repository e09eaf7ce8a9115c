//! `ledger_app.toml` app manifests

use serde::Deserialize;

pub const MANIFEST_FILE: &str = "ledger_app.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppManifest {
    pub app: AppSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppSection {
    pub sdk: String,
    #[serde(default)]
    pub devices: Vec<String>,
}

impl AppManifest {
    /// Parses a manifest, normalizing SDK and device names to lower case.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let mut manifest: AppManifest = toml::from_str(content)?;
        manifest.app.sdk = manifest.app.sdk.to_lowercase();
        for device in &mut manifest.app.devices {
            *device = device.to_lowercase();
        }
        Ok(manifest)
    }

    pub fn sdk(&self) -> &str {
        &self.app.sdk
    }

    pub fn supports(&self, manifest_device_name: &str) -> bool {
        self.app.devices.iter().any(|d| d == manifest_device_name)
    }
}
