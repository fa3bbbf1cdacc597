//! Project path resolution.

use std::path::{Path, PathBuf};

/// Absolute form of `path`, canonicalized when it exists.
///
/// Missing paths (outputs not written yet) are made absolute against the
/// current directory without touching the filesystem further.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path against the project root.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// `path` relative to `root` for display, or unchanged when outside it.
pub fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
