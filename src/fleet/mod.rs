//! App fleet enumeration
//!
//! Lists the organization's app repositories, reads each app's manifest and
//! keeps the apps matching the requested names, SDK and devices. The result
//! feeds CI build matrices.

pub mod github;
pub mod manifest;

use crate::device::Device;
use manifest::AppManifest;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use github::GitHubClient;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Invalid manifest for '{name}': {source}")]
    Manifest {
        name: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Repository listing entry, as returned by the hosting API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppRepository {
    pub name: String,
    pub default_branch: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub private: bool,
}

/// Where app repositories and their manifests come from
pub trait AppSource {
    /// Non-archived, public app repositories
    fn repositories(&self) -> Result<Vec<AppRepository>, FleetError>;

    /// The app's manifest, or `None` when the repository has none
    fn manifest(&self, repo: &AppRepository) -> Result<Option<AppManifest>, FleetError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sdk {
    C,
    Rust,
}

impl Sdk {
    pub fn manifest_name(self) -> &'static str {
        match self {
            Sdk::C => "c",
            Sdk::Rust => "rust",
        }
    }
}

/// Selection criteria for [`select_apps`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppFilter {
    pub devices: Vec<Device>,
    /// Lower-cased names. Non-empty means only these apps are selected.
    pub only: Vec<String>,
    /// Lower-cased names. Always empty when `only` is set.
    pub exclude: Vec<String>,
    /// Maximum number of apps, 0 for no limit
    pub limit: usize,
    pub sdks: Vec<Sdk>,
}

impl AppFilter {
    pub fn new(
        devices: Vec<Device>,
        only: &[String],
        exclude: &[String],
        limit: usize,
        sdks: Vec<Sdk>,
    ) -> Self {
        let only: Vec<String> = only.iter().map(|n| n.to_lowercase()).collect();
        // `only` takes precedence: names in both lists are selected
        let exclude = if only.is_empty() {
            exclude.iter().map(|n| n.to_lowercase()).collect()
        } else {
            Vec::new()
        };

        Self {
            devices,
            only,
            exclude,
            limit,
            sdks,
        }
    }

    fn is_full(&self, selected: usize) -> bool {
        (self.limit != 0 && selected >= self.limit)
            || (selected != 0 && selected == self.only.len())
    }
}

impl Default for AppFilter {
    fn default() -> Self {
        Self::new(
            Device::listable().collect(),
            &[],
            &[],
            0,
            vec![Sdk::C, Sdk::Rust],
        )
    }
}

/// Resolves device filter tokens; `all` selects every listable device.
pub fn resolve_devices<S: AsRef<str>>(tokens: &[S]) -> Vec<Device> {
    let mut selected = Vec::new();
    for token in tokens {
        let token = token.as_ref().to_lowercase();
        if token == "all" {
            return Device::listable().collect();
        }
        let name = if token == "nanosp" { "nanos+" } else { token.as_str() };
        match Device::from_manifest_name(name).filter(|d| d.targets().listable) {
            Some(device) => {
                if !selected.contains(&device) {
                    selected.push(device);
                }
            }
            None => warn!("Unknown device target '{}'. Ignoring.", token),
        }
    }
    selected
}

/// One selected app, shaped for CI matrix consumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub default_branch: String,
    /// JSON array rendered as a string, e.g. `["nanox", "stax"]`
    pub devices: String,
    pub name: String,
    pub repository: String,
}

impl AppInfo {
    pub fn new(
        org: &str,
        repo: &AppRepository,
        manifest: &AppManifest,
        devices: &[Device],
    ) -> Self {
        let compatible: Vec<&str> = devices
            .iter()
            .map(|d| d.manifest_name())
            .filter(|name| manifest.supports(name))
            .collect();

        Self {
            default_branch: repo.default_branch.clone(),
            devices: format!("[\"{}\"]", compatible.join("\", \"")),
            name: repo.name.clone(),
            repository: format!("{}/{}", org, repo.name),
        }
    }
}

/// Walks the source's apps and keeps those matching `filter`.
///
/// Apps without a manifest are skipped with a warning.
pub fn select_apps<S: AppSource>(
    source: &S,
    filter: &AppFilter,
    org: &str,
) -> Result<Vec<AppInfo>, FleetError> {
    info!("Fetching application repositories");
    let repos = source.repositories()?;
    debug!(count = repos.len(), "Repositories listed");

    let mut selected = Vec::new();
    for repo in &repos {
        if filter.is_full(selected.len()) {
            break;
        }

        info!("Managing app '{}'", repo.name);
        let name = repo.name.to_lowercase();
        if !filter.only.is_empty() && !filter.only.contains(&name) {
            debug!("App not selected, ignoring.");
            continue;
        }
        if filter.exclude.contains(&name) {
            debug!("Excluding this app");
            continue;
        }

        let Some(manifest) = source.manifest(repo)? else {
            warn!("Application '{}' has no manifest! Ignoring.", repo.name);
            continue;
        };
        if !filter.sdks.iter().any(|sdk| sdk.manifest_name() == manifest.sdk()) {
            debug!("Wrong SDK, ignoring this app");
            continue;
        }

        selected.push(AppInfo::new(org, repo, &manifest, &filter.devices));
    }

    Ok(selected)
}
