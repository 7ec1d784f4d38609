//! Shared test utilities for integration tests
//!
//! Builds small directory trees, scans them into content maps and reads
//! them back for comparison.

use mirror_move::map::{ContentMap, Scanner};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Serializes tests that touch process-wide environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Create a temp dir populated with `files` (relative path, content).
pub fn tree(files: &[(&str, &[u8])]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, content) in files {
        write_file(dir.path(), relative, content);
    }
    dir
}

/// Scan `root` from scratch.
pub fn scan(root: &Path) -> ContentMap {
    Scanner::new(root.to_path_buf())
        .scan(&ContentMap::new())
        .unwrap()
        .map
}

/// Every regular file under `root` as relative slash path to content.
/// Internal `.mirror-move*` files are left out.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with(".mirror-move"))
        .map(|e| {
            let relative = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

/// Path per hash, for comparing two maps by layout only.
pub fn layout(map: &ContentMap) -> BTreeMap<String, String> {
    map.iter()
        .map(|e| (e.hash.to_string(), e.path.clone()))
        .collect()
}

/// Run `f` with the given environment variables set, restoring them afterwards.
pub fn with_env<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(k, _)| (k.to_string(), std::env::var(k).ok()))
        .collect();
    for (k, v) in vars {
        std::env::set_var(k, v);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (k, v) in saved {
        match v {
            Some(v) => std::env::set_var(&k, v),
            None => std::env::remove_var(&k),
        }
    }

    match result {
        Ok(r) => r,
        Err(e) => std::panic::resume_unwind(e),
    }
}
