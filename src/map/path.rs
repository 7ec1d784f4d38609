//! Relative path normalization and safe resolution under a base directory

use std::path::{Component, Path, PathBuf};

/// Canonicalize a root directory (resolves symlinks, `..`, `.`).
///
/// Uses dunce so Windows roots stay in their familiar non-UNC form.
pub fn canonicalize_root(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// Render a path relative to a scan root as a slash-separated string.
///
/// Returns `None` for paths that are not valid UTF-8.
pub fn to_slash_string(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Normalize a path string read from a hash map (without filesystem access).
///
/// Backslashes become slashes, leading `./` and trailing slashes are dropped.
pub fn normalize_path_string(path: &str) -> String {
    let mut result = path.replace('\\', "/");
    while let Some(rest) = result.strip_prefix("./") {
        result = rest.to_string();
    }
    while result.len() > 1 && result.ends_with('/') {
        result.pop();
    }
    result
}

/// True when `path` names something strictly inside a base directory:
/// not empty, not absolute, no drive prefix, no `..` component.
pub fn is_safe_relative(path: &str) -> bool {
    let normalized = normalize_path_string(path);
    if normalized.is_empty() || normalized.starts_with('/') {
        return false;
    }
    Path::new(&normalized)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Join a map-relative path onto `base`, or `None` if it would escape `base`.
pub fn resolve_under(base: &Path, relative: &str) -> Option<PathBuf> {
    if !is_safe_relative(relative) {
        return None;
    }
    let normalized = normalize_path_string(relative);
    let mut resolved = base.to_path_buf();
    for part in normalized.split('/').filter(|p| !p.is_empty() && *p != ".") {
        resolved.push(part);
    }
    Some(resolved)
}

/// Parent directory of a slash-separated relative path, if it has one.
pub fn parent_of(relative: &str) -> Option<&str> {
    relative
        .rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
}
