//! Logging infrastructure.
//!
//! This module provides structured logging with daily file rotation,
//! contextual fields, and module-specific log levels.

use crate::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "swim-scraper".to_string(),
            default_level: Level::INFO,
            console: true,
            file: true,
            json_format: false,
        }
    }
}

/// Third-party targets that are only interesting when they misbehave
const QUIET_TARGETS: [&str; 4] = ["hyper", "reqwest", "html5ever", "selectors"];

impl LogConfig {
    /// Build from the `[logging]` section of the application config
    pub fn from_config(config: &Config, component: &str) -> Self {
        Self {
            log_dir: config.log_dir().to_string_lossy().to_string(),
            component: component.to_string(),
            default_level: parse_level(&config.logging.default_level),
            console: config.logging.console,
            file: config.logging.file,
            json_format: config.logging.json_format,
        }
    }
}

/// Parse a level name from configuration, falling back to INFO
pub fn parse_level(name: &str) -> Level {
    name.parse().unwrap_or(Level::INFO)
}

/// Default filter: our crates at the configured level, HTTP and HTML
/// parsing internals at warn
fn filter_directives(config: &LogConfig) -> String {
    let component = config.component.replace('-', "_");

    let mut directives: Vec<String> = Vec::new();
    for target in [component.as_str(), "shared", "swim_scraper"] {
        let directive = format!("{}={}", target, config.default_level);
        if !directives.contains(&directive) {
            directives.push(directive);
        }
    }
    directives.extend(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)));

    directives.join(",")
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the default filter when set. Console output is
/// human-readable; the file under `log_dir` rotates daily and is JSON when
/// `json_format` is on. Fails if a subscriber is already installed.
pub fn init(config: LogConfig) -> Result<()> {
    let log_dir = Path::new(&config.log_dir);
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config)));

    let mut layers = Vec::new();

    // Stdout carries command output, so the console layer writes to stderr
    if config.console {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .boxed(),
        );
    }

    if config.file {
        let appender = tracing_appender::rolling::daily(log_dir, &config.component);
        let layer = fmt::layer().with_target(true).with_ansi(false);

        layers.push(if config.json_format {
            layer
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(appender)
                .boxed()
        } else {
            layer
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(appender)
                .boxed()
        });
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        component = %config.component,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    Ok(())
}
