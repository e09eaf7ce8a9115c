//! Configuration management for appdump
//!
//! Settings are loaded from environment variables with sensible defaults so
//! CI jobs can point the tool at alternative binaries or API endpoints
//! without changing the command line.
//!
//! # Environment Variables
//!
//! - `APPDUMP_MAKE`: make binary - default: "make"
//! - `APPDUMP_CARGO`: cargo binary - default: "cargo"
//! - `RUST_NIGHTLY`: cargo toolchain passed as `+<toolchain>` - default: none
//! - `APPDUMP_GITHUB_API`: REST API base URL - default: "https://api.github.com"
//! - `APPDUMP_GITHUB_RAW`: raw content base URL - default: "https://raw.githubusercontent.com"
//! - `APPDUMP_GITHUB_ORG`: organization owning the apps - default: "LedgerHQ"
//! - `GITHUB_TOKEN`: API token - default: none
//! - `APPDUMP_REQUEST_TIMEOUT`: HTTP timeout in seconds - default: "30"
//! - `APPDUMP_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use appdump::AppDumpConfig;
//!
//! let config = AppDumpConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_MAKE: &str = "make";
const DEFAULT_CARGO: &str = "cargo";
const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_GITHUB_RAW: &str = "https://raw.githubusercontent.com";
const DEFAULT_GITHUB_ORG: &str = "LedgerHQ";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct AppDumpConfig {
    pub make_program: String,
    pub cargo_program: String,
    /// Toolchain for `cargo +<toolchain> metadata`
    pub cargo_toolchain: Option<String>,
    pub github_api_url: String,
    pub github_raw_url: String,
    pub github_org: String,
    pub github_token: Option<String>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for AppDumpConfig {
    /// Loads configuration from `APPDUMP_*` environment variables
    fn default() -> Self {
        let request_timeout_secs = env::var("APPDUMP_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = env::var("APPDUMP_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            make_program: non_empty_var("APPDUMP_MAKE").unwrap_or_else(|| DEFAULT_MAKE.to_string()),
            cargo_program: non_empty_var("APPDUMP_CARGO")
                .unwrap_or_else(|| DEFAULT_CARGO.to_string()),
            cargo_toolchain: non_empty_var("RUST_NIGHTLY"),
            github_api_url: non_empty_var("APPDUMP_GITHUB_API")
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
            github_raw_url: non_empty_var("APPDUMP_GITHUB_RAW")
                .unwrap_or_else(|| DEFAULT_GITHUB_RAW.to_string()),
            github_org: non_empty_var("APPDUMP_GITHUB_ORG")
                .unwrap_or_else(|| DEFAULT_GITHUB_ORG.to_string()),
            github_token: non_empty_var("GITHUB_TOKEN"),
            request_timeout_secs,
            log_level,
        }
    }
}

impl AppDumpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        for (name, url) in [
            ("GitHub API URL", &self.github_api_url),
            ("GitHub raw URL", &self.github_raw_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be an http(s) URL: {}",
                    name, url
                )));
            }
        }

        if self.github_org.contains('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid GitHub organization: {}",
                self.github_org
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Token from the command line, falling back to `GITHUB_TOKEN`
    pub fn token_or(&self, cli_token: Option<&str>) -> Option<String> {
        cli_token
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| self.github_token.clone())
    }
}

impl fmt::Display for AppDumpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "appdump configuration:")?;
        writeln!(f, "  make: {}", self.make_program)?;
        match &self.cargo_toolchain {
            Some(toolchain) => writeln!(f, "  cargo: {} (+{})", self.cargo_program, toolchain)?,
            None => writeln!(f, "  cargo: {}", self.cargo_program)?,
        }
        writeln!(f, "  GitHub API: {}", self.github_api_url)?;
        writeln!(f, "  GitHub raw: {}", self.github_raw_url)?;
        writeln!(f, "  GitHub org: {}", self.github_org)?;
        writeln!(
            f,
            "  GitHub token: {}",
            if self.github_token.is_some() { "set" } else { "not set" }
        )?;
        writeln!(f, "  Request timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Log level: {}", self.log_level)?;
        Ok(())
    }
}
