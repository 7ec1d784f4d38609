//! Filesystem views the reconciler applies moves through.
//!
//! Execute mode mutates the disk via [`LiveFs`]. Dry-run mode uses
//! [`SimulatedFs`], which overlays the effects of earlier simulated moves and
//! directory creations on top of the real disk, so both modes take the same
//! decisions for the same starting state.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// What occupies a path, as far as moves are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// A regular file, or a symlink resolving to one
    File,
    Dir,
    /// Anything else: dangling symlinks, sockets, devices
    Other,
}

pub(crate) trait FsView {
    /// What occupies `path`, or `None` when nothing does. A path below a
    /// non-directory is reported as `None`.
    fn kind(&self, path: &Path) -> Option<EntryKind>;
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;
    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool {
        self.kind(path).is_some()
    }
}

fn on_disk(path: &Path) -> Option<EntryKind> {
    let meta = std::fs::symlink_metadata(path).ok()?;
    let file_type = meta.file_type();
    if file_type.is_dir() {
        Some(EntryKind::Dir)
    } else if file_type.is_file() {
        Some(EntryKind::File)
    } else if file_type.is_symlink()
        && std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    {
        Some(EntryKind::File)
    } else {
        Some(EntryKind::Other)
    }
}

#[derive(Debug, Default)]
pub(crate) struct LiveFs;

impl FsView for LiveFs {
    fn kind(&self, path: &Path) -> Option<EntryKind> {
        on_disk(path)
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}

/// Only files are ever renamed, so anything moved in occupies its
/// destination as a file.
#[derive(Debug, Default)]
pub(crate) struct SimulatedFs {
    created: HashSet<PathBuf>,
    occupied: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
}

impl FsView for SimulatedFs {
    fn kind(&self, path: &Path) -> Option<EntryKind> {
        if self.occupied.contains(path) {
            return Some(EntryKind::File);
        }
        if self.created.contains(path) {
            return Some(EntryKind::Dir);
        }
        if self.vacated.contains(path) {
            return None;
        }
        on_disk(path)
    }

    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        let mut missing = Vec::new();
        for dir in path.ancestors() {
            if dir.as_os_str().is_empty() {
                break;
            }
            match self.kind(dir) {
                Some(EntryKind::Dir) => break,
                Some(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} exists and is not a directory", dir.display()),
                    ))
                }
                None => missing.push(dir.to_path_buf()),
            }
        }
        self.created.extend(missing);
        Ok(())
    }

    fn rename(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        self.occupied.remove(from);
        self.vacated.insert(from.to_path_buf());
        self.vacated.remove(to);
        self.occupied.insert(to.to_path_buf());
        Ok(())
    }
}
