//! Logging setup.
//!
//! Library code logs through the `log` facade. Applications that do not
//! install their own logger can call [`init_logging`] to get an
//! `env_logger` backend configured from [`LoggingConfig`].

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Trace => write!(f, "TRACE"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Include timestamps in logs
    pub include_timestamp: bool,
    /// Include module path in logs
    pub include_module_path: bool,
    /// Let `RUST_LOG` override `level`
    pub respect_env: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            include_timestamp: true,
            include_module_path: true,
            respect_env: true,
        }
    }
}

fn builder(config: &LoggingConfig) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(config.level.into())
        .format_module_path(config.include_module_path);

    if !config.include_timestamp {
        builder.format_timestamp(None);
    }
    if config.respect_env {
        builder.parse_default_env();
    }
    builder
}

/// Install the global logger.
///
/// Returns `false` if a logger was already installed, which is not an error.
pub fn init_logging(config: &LoggingConfig) -> bool {
    match builder(config).try_init() {
        Ok(()) => {
            log::debug!("logger initialized with level {}", config.level);
            true
        }
        Err(_) => false,
    }
}
