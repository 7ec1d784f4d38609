//! Content-hash maps
//!
//! A [`ContentMap`] records, for each distinct file content in a directory
//! tree, the path and modification time at which that content was last seen.
//! Maps are produced by the incremental [`scan::Scanner`] and consumed by the
//! reconciler.

pub mod hasher;
pub mod path;
pub mod scan;
pub mod store;
pub mod walker;

pub use hasher::HashAlgorithm;
pub use scan::{ScanOptions, ScanOutcome, ScanStats, Scanner};
pub use store::MapFile;

use crate::types::ContentHash;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One known file content-identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashEntry {
    /// Slash-separated path relative to the scan root
    pub path: String,
    /// Modification time (seconds) when the content was last hashed
    pub updated: i64,
    pub hash: ContentHash,
    /// File size in bytes; absent in maps written by older tooling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl HashEntry {
    pub fn new(hash: impl Into<ContentHash>, path: impl Into<String>, updated: i64) -> Self {
        Self {
            path: path.into(),
            updated,
            hash: hash.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Whether the cached hash can be reused for a file with this signature.
    pub fn is_fresh(&self, modified: i64, size: u64) -> bool {
        self.updated == modified && self.size.map_or(true, |s| s == size)
    }
}

/// Mapping from content hash to the entry last observed for that content.
///
/// Keys are kept sorted so the serialized form is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContentMap {
    entries: BTreeMap<ContentHash, HashEntry>,
}

impl ContentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&HashEntry> {
        self.entries.get(hash)
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.entries.contains_key(hash)
    }

    /// Entries in hash order
    pub fn iter(&self) -> impl Iterator<Item = &HashEntry> {
        self.entries.values()
    }

    /// Insert or overwrite the entry for `entry.hash`.
    pub fn insert(&mut self, entry: HashEntry) -> Option<HashEntry> {
        self.entries.insert(entry.hash.clone(), entry)
    }

    /// Insert an entry, resolving duplicate content deterministically: when the
    /// hash is already present, the lexicographically smallest path is kept.
    ///
    /// Returns the entry that lost, if two different paths collided.
    pub fn merge_entry(&mut self, entry: HashEntry) -> Option<HashEntry> {
        match self.entries.get_mut(&entry.hash) {
            None => {
                self.entries.insert(entry.hash.clone(), entry);
                None
            }
            Some(existing) if existing.path == entry.path => {
                *existing = entry;
                None
            }
            Some(existing) if entry.path < existing.path => {
                Some(std::mem::replace(existing, entry))
            }
            Some(_) => Some(entry),
        }
    }

    /// Lookup table from path to entry. If a stale map lists one path under
    /// several hashes, the entry with the greatest hash wins.
    pub fn path_index(&self) -> HashMap<&str, &HashEntry> {
        self.entries
            .values()
            .map(|entry| (entry.path.as_str(), entry))
            .collect()
    }
}

impl FromIterator<HashEntry> for ContentMap {
    fn from_iter<I: IntoIterator<Item = HashEntry>>(iter: I) -> Self {
        let mut map = ContentMap::new();
        for entry in iter {
            map.insert(entry);
        }
        map
    }
}

impl<'a> IntoIterator for &'a ContentMap {
    type Item = &'a HashEntry;
    type IntoIter = std::collections::btree_map::Values<'a, ContentHash, HashEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
