//! Incremental scanner: walks a tree and produces a content map, re-hashing
//! only files whose (size, mtime) signature changed since the previous map.

use crate::error::{ScanError, ScanReadError};
use crate::map::hasher::{self, HashAlgorithm, DEFAULT_CHUNK_SIZE};
use crate::map::path;
use crate::map::store::MapFile;
use crate::map::walker::{FileEntry, Walker, WalkerConfig};
use crate::map::{ContentMap, HashEntry};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Scanner options
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub algorithm: HashAlgorithm,
    pub chunk_size: usize,
    /// Ignore the previous map and re-hash every file
    pub force: bool,
    /// Persist a checkpoint after this many newly hashed files (0 = never)
    pub checkpoint_every: usize,
    pub walker: WalkerConfig,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            force: false,
            checkpoint_every: 0,
            walker: WalkerConfig::default(),
        }
    }
}

/// Counters for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub files_seen: usize,
    pub hashed: usize,
    pub reused: usize,
    /// Files whose content was already recorded under a smaller path. These
    /// paths never reach the map, so every incremental scan hashes them again.
    pub duplicates: usize,
    /// Previous entries whose path no longer exists
    pub pruned: usize,
    pub errors: usize,
    pub checkpoints: usize,
}

/// Result of a scan
#[derive(Debug)]
pub struct ScanOutcome {
    pub map: ContentMap,
    pub errors: Vec<ScanReadError>,
    pub stats: ScanStats,
}

/// Incremental content-map builder for one root directory
pub struct Scanner {
    root: PathBuf,
    options: ScanOptions,
    checkpoint: Option<MapFile>,
}

impl Scanner {
    pub fn new(root: PathBuf) -> Self {
        Self::with_options(root, ScanOptions::default())
    }

    pub fn with_options(root: PathBuf, options: ScanOptions) -> Self {
        Self {
            root,
            options,
            checkpoint: None,
        }
    }

    /// Write partial progress to `file` every `checkpoint_every` hashed files.
    /// The file is also excluded from the walk when it lives under the root.
    pub fn with_checkpoint(mut self, file: MapFile) -> Self {
        self.checkpoint = Some(file);
        self
    }

    /// Scan the root, reusing hashes from `previous` for unchanged files.
    #[instrument(skip(self, previous), fields(root = %self.root.display(), force = self.options.force))]
    pub fn scan(&self, previous: &ContentMap) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();

        if !self.root.exists() {
            return Err(ScanError::RootNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::RootNotDirectory(self.root.clone()));
        }
        let root = path::canonicalize_root(&self.root)
            .map_err(|_| ScanError::RootNotFound(self.root.clone()))?;

        let mut walker_config = self.options.walker.clone();
        if let Some(abs) = self.checkpoint.as_ref().and_then(MapFile::absolute_path) {
            walker_config.skip_paths.push(abs);
        }
        let walk = Walker::with_config(root, walker_config).walk();
        for error in &walk.errors {
            warn!(path = %error.path, reason = %error.reason, "Skipping unreadable entry");
        }

        let previous = if self.options.force {
            None
        } else {
            Some(previous)
        };
        let cached = previous.map(ContentMap::path_index).unwrap_or_default();
        info!(
            files = walk.files.len(),
            cached = cached.len(),
            "Walked filesystem"
        );

        let mut map = ContentMap::new();
        let mut errors = walk.errors;
        let mut stats = ScanStats {
            files_seen: walk.files.len(),
            ..ScanStats::default()
        };
        let mut processed: HashSet<&str> = HashSet::with_capacity(walk.files.len());
        let mut since_checkpoint = 0usize;

        for file in &walk.files {
            processed.insert(file.relative.as_str());

            let hash = match cached.get(file.relative.as_str()) {
                Some(entry) if entry.is_fresh(file.modified, file.size) => {
                    trace!(path = %file.relative, "Reusing cached hash");
                    stats.reused += 1;
                    entry.hash.clone()
                }
                _ => match self.hash(file) {
                    Ok(hash) => {
                        debug!(path = %file.relative, hash = %hash.short(), "Hashed file");
                        stats.hashed += 1;
                        since_checkpoint += 1;
                        hash
                    }
                    Err(e) => {
                        warn!(path = %file.relative, error = %e, "Skipping unreadable file");
                        errors.push(ScanReadError {
                            path: file.relative.clone(),
                            reason: e.to_string(),
                        });
                        continue;
                    }
                },
            };

            let entry = HashEntry {
                path: file.relative.clone(),
                updated: file.modified,
                hash,
                size: Some(file.size),
            };
            if let Some(dropped) = map.merge_entry(entry) {
                stats.duplicates += 1;
                debug!(
                    hash = %dropped.hash.short(),
                    dropped = %dropped.path,
                    "Duplicate content; keeping smallest path"
                );
            }

            if self.options.checkpoint_every > 0
                && since_checkpoint >= self.options.checkpoint_every
            {
                if let Some(file) = &self.checkpoint {
                    let snapshot = checkpoint_snapshot(&map, previous, &processed);
                    file.save(&snapshot)?;
                    stats.checkpoints += 1;
                    since_checkpoint = 0;
                    debug!(entries = snapshot.len(), "Checkpoint written");
                }
            }
        }

        let seen: HashSet<&str> = walk.files.iter().map(|f| f.relative.as_str()).collect();
        stats.pruned = previous
            .map(|p| p.iter().filter(|e| !seen.contains(e.path.as_str())).count())
            .unwrap_or(0);
        stats.errors = errors.len();

        info!(
            entries = map.len(),
            hashed = stats.hashed,
            reused = stats.reused,
            duplicates = stats.duplicates,
            pruned = stats.pruned,
            errors = stats.errors,
            duration_ms = start.elapsed().as_millis(),
            "Scan complete"
        );

        Ok(ScanOutcome { map, errors, stats })
    }

    fn hash(&self, file: &FileEntry) -> std::io::Result<crate::types::ContentHash> {
        hasher::hash_file(&file.path, self.options.algorithm, self.options.chunk_size)
    }
}

/// Map to persist mid-scan: everything hashed so far, plus previous entries for
/// files not yet reached so an interrupted scan can resume from the cache.
fn checkpoint_snapshot(
    map: &ContentMap,
    previous: Option<&ContentMap>,
    processed: &HashSet<&str>,
) -> ContentMap {
    let mut snapshot = map.clone();
    if let Some(previous) = previous {
        for entry in previous {
            if !processed.contains(entry.path.as_str()) && !snapshot.contains(&entry.hash) {
                snapshot.insert(entry.clone());
            }
        }
    }
    snapshot
}
