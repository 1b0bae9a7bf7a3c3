// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Tries a plain `strip_prefix(root)` first, then canonicalizes both sides
/// (symlinked temp dirs on macOS report `/private/var/...`). Returns `None`
/// if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    // A removed file cannot be canonicalized; fall back to its parent.
    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok().or_else(|| {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    })?;

    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
