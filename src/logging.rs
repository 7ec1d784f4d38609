//! Logging System
//!
//! Structured logging using the `tracing` crate. Log records go to stderr, and
//! additionally to a file when one is configured, so stdout stays reserved
//! for the human-readable report.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Disable all log output when false
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Append log records to this file as well as stderr
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format, stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            file: None,
            color: default_true(),
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(format!("Invalid log level: {}", self.level));
        }
        if self.format != "json" && self.format != "text" {
            return Err(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                self.format
            ));
        }
        Ok(())
    }
}

type Filtered = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Initialize the global subscriber.
///
/// Priority order (highest to lowest):
/// 1. `MIRROR_MOVE_LOG` / `MIRROR_MOVE_LOG_FORMAT` environment variables
/// 2. The given configuration (already merged from CLI flags and config files)
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(stderr_layer(&format, config.color));

    if let Some(path) = &config.file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::ConfigError(format!("Failed to create log directory: {}", e))
            })?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ApiError::ConfigError(format!("Failed to open log file {:?}: {}", path, e))
            })?;
        layers.push(file_layer(&format, file));
    }

    Registry::default()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn stderr_layer(format: &str, color: bool) -> BoxedLayer {
    if format == "json" {
        fmt::layer()
            .json()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(color)
            .with_writer(std::io::stderr)
            .boxed()
    }
}

fn file_layer(format: &str, file: std::fs::File) -> BoxedLayer {
    let writer = Mutex::new(file);
    if format == "json" {
        fmt::layer()
            .json()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    }
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env("MIRROR_MOVE_LOG") {
        return Ok(filter);
    }

    if !config.enabled || config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| ApiError::ConfigError(format!("Invalid log directive: {}", e)))?,
        );
    }
    Ok(filter)
}

/// Determine output format from config or environment
fn determine_format(config: &LoggingConfig) -> Result<String, ApiError> {
    if let Ok(format) = std::env::var("MIRROR_MOVE_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    config.validate().map_err(ApiError::ConfigError)?;
    Ok(config.format.clone())
}
