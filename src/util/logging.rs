//! Structured logging setup
//!
//! Logs go to stderr through a `tracing` subscriber so that commands printing
//! JSON on stdout (`list-apps`) stay machine-readable. When `RUST_LOG` is set
//! its directives replace the configured level.
//!
//! ```no_run
//! use appdump::util::{init_logging, LoggingConfig};
//! use tracing::Level;
//!
//! init_logging(LoggingConfig::with_level(Level::DEBUG));
//! tracing::info!(build_dir = "app", "Dumping parameters");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// One JSON object per line instead of human-readable text
    pub use_json: bool,
    pub include_target: bool,
    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Resolves the level from command-line flags.
    ///
    /// An explicit `--log-level` wins, then `-q`, then the `-v` count
    /// (`-v` debug, `-vv` trace), then `fallback`.
    pub fn from_cli(log_level: Option<&str>, verbose: u8, quiet: bool, fallback: &str) -> Self {
        let level = if let Some(level_str) = log_level {
            parse_level(level_str)
        } else if quiet {
            Level::ERROR
        } else {
            match verbose {
                0 => parse_level(fallback),
                1 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };

        let use_json = env::var("APPDUMP_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            ..Default::default()
        }
    }
}

/// Parses a level name (case-insensitive); unknown names fall back to INFO.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Filter for the configured level. A set `RUST_LOG` replaces it entirely.
fn env_filter(level: Level, rust_log: Option<&str>) -> EnvFilter {
    if let Some(directives) = rust_log {
        return EnvFilter::new(directives);
    }

    let mut filter = EnvFilter::new("");
    for directive in [
        format!("appdump={}", level),
        "hyper=warn".to_string(),
        "hyper_util=warn".to_string(),
        "reqwest=warn".to_string(),
    ] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = env_filter(config.level, env::var("RUST_LOG").ok().as_deref());

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
    });
}
