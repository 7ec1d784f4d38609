//! Filesystem walker collecting the regular files under a scan root

use crate::error::ScanReadError;
use crate::map::path;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::{DirEntry, WalkDir};

/// File names starting with this prefix belong to the tool itself
/// (lock file, in-flight map writes) and are never scanned.
pub const INTERNAL_PREFIX: &str = ".mirror-move";

/// A regular file found under the scan root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Slash-separated path relative to the scan root
    pub relative: String,
    pub size: u64,
    /// Modification time in whole seconds since the Unix epoch
    pub modified: i64,
}

/// Filesystem walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false for determinism)
    pub follow_symlinks: bool,
    /// Path components to skip entirely (e.g. ".git")
    pub ignore_patterns: Vec<String>,
    /// Absolute paths to skip, such as the map file being written
    pub skip_paths: Vec<PathBuf>,
}

/// Result of one walk: the files found plus anything that could not be read.
#[derive(Debug, Default)]
pub struct Walk {
    pub files: Vec<FileEntry>,
    pub errors: Vec<ScanReadError>,
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the filesystem and collect regular files.
    ///
    /// Files are sorted by relative path for determinism. Entries that cannot
    /// be read are reported in [`Walk::errors`] and do not stop the walk.
    pub fn walk(&self) -> Walk {
        let mut walk = Walk::default();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.should_ignore(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let location = e
                        .path()
                        .map(|p| self.display_relative(p))
                        .unwrap_or_else(|| self.root.display().to_string());
                    walk.errors.push(ScanReadError {
                        path: location,
                        reason: format!("Failed to walk directory: {}", e),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.file_entry(&entry) {
                Ok(file) => walk.files.push(file),
                Err(reason) => walk.errors.push(ScanReadError {
                    path: self.display_relative(entry.path()),
                    reason,
                }),
            }
        }

        walk.files.sort_by(|a, b| a.relative.cmp(&b.relative));
        walk
    }

    fn file_entry(&self, entry: &DirEntry) -> Result<FileEntry, String> {
        let metadata = entry
            .metadata()
            .map_err(|e| format!("Failed to read metadata: {}", e))?;
        let relative = entry
            .path()
            .strip_prefix(&self.root)
            .ok()
            .and_then(path::to_slash_string)
            .ok_or_else(|| "Path is not valid UTF-8".to_string())?;
        let modified = metadata
            .modified()
            .map_err(|e| format!("Failed to read modification time: {}", e))?;

        Ok(FileEntry {
            path: entry.path().to_path_buf(),
            relative,
            size: metadata.len(),
            modified: unix_seconds(modified),
        })
    }

    /// Check if an entry should be skipped: ignore patterns match a component
    /// name exactly, tool-internal files, and explicitly skipped paths.
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(INTERNAL_PREFIX) {
            return true;
        }
        if self.config.ignore_patterns.iter().any(|p| p.as_str() == name) {
            return true;
        }
        self.config.skip_paths.iter().any(|p| p == entry.path())
    }

    fn display_relative(&self, p: &Path) -> String {
        p.strip_prefix(&self.root)
            .unwrap_or(p)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Whole seconds since the Unix epoch, negative for earlier timestamps.
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
