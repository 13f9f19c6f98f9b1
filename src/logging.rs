//! Structured logging setup.
//!
//! The router logs through `tracing`; binaries call [`init_logging`] once to
//! install a `tracing_subscriber` formatter writing to stderr.
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `MICRO_ROUTER_LOG_LEVEL` | `info` | trace/debug/info/warn/error |
//! | `MICRO_ROUTER_LOG_FORMAT` | `pretty` | `json` or `pretty` |
//! | `MICRO_ROUTER_LOG_TARGET_FILTER` | unset | extra comma-separated directives |
//!
//! `RUST_LOG`, when set, replaces the level.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingSection;

/// Log format: JSON for machines, pretty-print for humans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Comma-separated filter directives
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_section(&LoggingSection::default())
    }
}

impl LogConfig {
    /// Settings from a `[logging]` config table.
    #[must_use]
    pub fn from_section(section: &LoggingSection) -> Self {
        Self {
            log_level: section.level.clone(),
            format: LogFormat::parse(&section.format),
            target_filter: None,
            include_location: false,
        }
    }

    /// Defaults overridden by `MICRO_ROUTER_LOG_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = env::var("MICRO_ROUTER_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(format) = env::var("MICRO_ROUTER_LOG_FORMAT") {
            self.format = LogFormat::parse(&format);
        }
        if let Ok(filter) = env::var("MICRO_ROUTER_LOG_TARGET_FILTER") {
            self.target_filter = Some(filter);
        }
        self
    }

    /// Parsed level; unknown names fall back to INFO.
    #[must_use]
    pub fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Build the filter: `RUST_LOG` or the level, plus target directives.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                match directive.parse() {
                    Ok(d) => filter = filter.add_directive(d),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
                }
            }
        }
        filter
    }
}

/// Install the global subscriber.
///
/// Fails when a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    tracing::debug!(level = %config.log_level, format = ?config.format, "Logging initialized");
    Ok(())
}
