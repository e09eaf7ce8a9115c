//! GitHub-backed [`AppSource`]

use super::manifest::{AppManifest, MANIFEST_FILE};
use super::{AppRepository, AppSource, FleetError};
use crate::config::AppDumpConfig;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const PER_PAGE: usize = 100;

/// Only repositories with this prefix are apps
pub const APP_PREFIX: &str = "app-";

pub struct GitHubClient {
    client: Client,
    api_url: String,
    raw_url: String,
    org: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &AppDumpConfig, token: Option<String>) -> Result<Self, FleetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("appdump/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
            raw_url: config.github_raw_url.trim_end_matches('/').to_string(),
            org: config.github_org.clone(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn repositories_page(&self, page: usize) -> Result<Vec<AppRepository>, FleetError> {
        let url = format!(
            "{}/orgs/{}/repos?per_page={}&page={}",
            self.api_url, self.org, PER_PAGE, page
        );
        debug!(%url, "Fetching repository page");

        let response = self
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .send()?;
        if !response.status().is_success() {
            return Err(FleetError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(response.json()?)
    }
}

impl AppSource for GitHubClient {
    fn repositories(&self) -> Result<Vec<AppRepository>, FleetError> {
        let mut apps = Vec::new();
        for page in 1.. {
            let repos = self.repositories_page(page)?;
            let last_page = repos.len() < PER_PAGE;
            apps.extend(
                repos
                    .into_iter()
                    .filter(|r| !r.archived && !r.private && r.name.starts_with(APP_PREFIX)),
            );
            if last_page {
                break;
            }
        }
        Ok(apps)
    }

    fn manifest(&self, repo: &AppRepository) -> Result<Option<AppManifest>, FleetError> {
        let url = format!(
            "{}/{}/{}/{}/{}",
            self.raw_url, self.org, repo.name, repo.default_branch, MANIFEST_FILE
        );
        debug!(%url, "Fetching manifest");

        let response = self.get(&url).send()?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if !status.is_success() => Err(FleetError::Status {
                url,
                status: status.as_u16(),
            }),
            _ => {
                let content = response.text()?;
                AppManifest::parse(&content)
                    .map(Some)
                    .map_err(|source| FleetError::Manifest {
                        name: repo.name.clone(),
                        source,
                    })
            }
        }
    }
}
