//! Persistence for content maps: JSON on disk, replaced atomically

use crate::error::MapError;
use crate::map::path::normalize_path_string;
use crate::map::walker::INTERNAL_PREFIX;
use crate::map::{ContentMap, HashEntry};
use crate::types::ContentHash;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A stored record. Older tooling wrote a bare path string per hash and
/// omitted `updated`; both shapes load.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Record {
        path: String,
        #[serde(default)]
        updated: i64,
        #[serde(default)]
        hash: Option<ContentHash>,
        #[serde(default)]
        size: Option<u64>,
    },
    Path(String),
}

/// A content map file on disk
#[derive(Debug, Clone)]
pub struct MapFile {
    path: PathBuf,
}

impl MapFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute form of the file path (parent canonicalized), if the parent exists.
    pub fn absolute_path(&self) -> Option<PathBuf> {
        let file_name = self.path.file_name()?;
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        dunce::canonicalize(parent).ok().map(|p| p.join(file_name))
    }

    /// Load and validate the map. A missing file is an error.
    pub fn load(&self) -> Result<ContentMap, MapError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| MapError::Io {
            path: self.path.clone(),
            source,
        })?;
        let map = parse_map(&text, &self.path)?;
        debug!(path = %self.path.display(), entries = map.len(), "Loaded hash map");
        Ok(map)
    }

    /// Load the map, or return an empty one if the file does not exist yet.
    pub fn load_or_default(&self) -> Result<ContentMap, MapError> {
        if self.path.exists() {
            self.load()
        } else {
            Ok(ContentMap::new())
        }
    }

    /// Write the map atomically: serialize into a temporary sibling, fsync,
    /// then rename over the target. A crash leaves either the old or the new
    /// file, never a truncated one.
    pub fn save(&self, map: &ContentMap) -> Result<(), MapError> {
        let json = to_json(map)?;
        let write_err = |source| MapError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(&format!("{}-", INTERNAL_PREFIX))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(write_err)?;
        temp.write_all(json.as_bytes()).map_err(write_err)?;
        temp.write_all(b"\n").map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), entries = map.len(), "Wrote hash map");
        Ok(())
    }
}

/// Pretty-printed JSON with sorted keys.
pub fn to_json(map: &ContentMap) -> Result<String, MapError> {
    serde_json::to_string_pretty(map).map_err(MapError::Serialize)
}

/// Parse map text. `origin` is only used in error messages.
pub fn parse_map(text: &str, origin: &Path) -> Result<ContentMap, MapError> {
    let raw: BTreeMap<ContentHash, StoredEntry> =
        serde_json::from_str(text).map_err(|source| MapError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

    let mut map = ContentMap::new();
    for (key, stored) in raw {
        let entry = match stored {
            StoredEntry::Record {
                path,
                updated,
                hash,
                size,
            } => {
                if let Some(recorded) = hash {
                    if recorded != key {
                        return Err(MapError::KeyMismatch {
                            path: origin.to_path_buf(),
                            key: key.to_string(),
                            recorded: recorded.to_string(),
                        });
                    }
                }
                HashEntry {
                    path: normalize_path_string(&path),
                    updated,
                    hash: key,
                    size,
                }
            }
            StoredEntry::Path(path) => HashEntry::new(key, normalize_path_string(&path), 0),
        };
        map.insert(entry);
    }
    Ok(map)
}
