//! Configuration System
//!
//! Layered configuration (defaults, global file, `--config` file, environment)
//! for scanning, reconciliation and logging. CLI flags override the result.

use crate::logging::LoggingConfig;
use crate::map::hasher::{HashAlgorithm, DEFAULT_CHUNK_SIZE};
use crate::map::walker::WalkerConfig;
use crate::map::ScanOptions;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hash-map builder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub algorithm: HashAlgorithm,

    /// Read size when streaming files through the hasher
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Persist a checkpoint after this many newly hashed files (0 disables)
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,

    /// Path components skipped during the walk (e.g. ".git")
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_checkpoint_every() -> usize {
    100
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: default_chunk_size(),
            checkpoint_every: default_checkpoint_every(),
            ignore_patterns: Vec::new(),
            follow_symlinks: false,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than zero".to_string());
        }
        if self.ignore_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err("ignore_patterns cannot contain empty entries".to_string());
        }
        Ok(())
    }

    /// Scanner options for these settings; `force` comes from the command line.
    pub fn to_options(&self, force: bool) -> ScanOptions {
        ScanOptions {
            algorithm: self.algorithm,
            chunk_size: self.chunk_size,
            force,
            checkpoint_every: self.checkpoint_every,
            walker: WalkerConfig {
                follow_symlinks: self.follow_symlinks,
                ignore_patterns: self.ignore_patterns.clone(),
                ..WalkerConfig::default()
            },
        }
    }
}

/// Reconciler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Take `<base>/.mirror-move.lock` while executing moves
    #[serde(default = "default_true")]
    pub lock: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { lock: true }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Scan(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Scan(msg) => write!(f, "scan: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl MirrorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.scan.validate() {
            errors.push(ValidationError::Scan(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
