//! mirror-move: Content-Addressed Directory Reconciliation
//!
//! Records a directory tree as a map from content hash to relative path, then
//! reorganizes another directory holding the same files so that it matches a
//! target map. Files are only ever renamed; nothing is copied or deleted.

pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod map;
pub mod reconcile;
pub mod types;
