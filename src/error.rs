//! Error types for hash-map handling, scanning, and move reconciliation.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Hash-map file errors. Fatal for a reconciliation: raised before any mutation.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to read hash map {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse hash map {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Hash map {path:?} entry keyed {key} records hash {recorded}")]
    KeyMismatch {
        path: PathBuf,
        key: String,
        recorded: String,
    },

    #[error("Failed to serialize hash map: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write hash map {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal scan errors. Per-file failures are [`ScanReadError`]s instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan root does not exist: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Scan root is not a directory: {0:?}")]
    RootNotDirectory(PathBuf),

    #[error(transparent)]
    Map(#[from] MapError),
}

/// A file that could not be walked, opened, or hashed. The scan skips it and continues.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{path}: {reason}")]
pub struct ScanReadError {
    pub path: String,
    pub reason: String,
}

/// Why a single planned move was not carried out.
///
/// These are recorded in the reconciliation result and never abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveFailure {
    #[error("Source file not found")]
    SourceNotFound,

    #[error("Destination already exists")]
    DestinationConflict,

    #[error("Destination parent is not a directory: {path}")]
    ParentNotDirectory { path: String },

    #[error("Move failed: {reason}")]
    MoveFailed { reason: String },

    #[error("Path escapes base directory: {path}")]
    UnsafePath { path: String },
}

/// Fatal reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Base directory does not exist: {0:?}")]
    BaseDirNotFound(PathBuf),
}

/// Top-level error surfaced by the CLI. Every variant maps to exit code 1.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not load hash maps: {0}")]
    Map(#[from] MapError),

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Another reconciliation is running (lock file {0:?} exists)")]
    Locked(PathBuf),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
