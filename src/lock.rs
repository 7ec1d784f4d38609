//! Exclusive lock file guarding a base directory during an executing reconciliation

use crate::error::ApiError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const LOCK_FILE_NAME: &str = ".mirror-move.lock";

/// Held for the duration of a run; the lock file is removed on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Create `<base_dir>/.mirror-move.lock`, failing with [`ApiError::Locked`]
    /// if another run already holds it.
    pub fn acquire(base_dir: &Path) -> Result<Self, ApiError> {
        let path = base_dir.join(LOCK_FILE_NAME);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(ApiError::Locked(path)),
            Err(e) => return Err(ApiError::Io(e)),
        };
        writeln!(
            file,
            "pid={} acquired={}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        )?;
        debug!(path = %path.display(), "Acquired run lock");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove run lock");
        }
    }
}
