//! Filesystem path utilities.
//!
//! - `normalize_path` - absolute form (canonicalize + fallback)
//! - `clean` / `clean_join` - lexical `.`/`..` folding without touching disk
//! - `relative_path` - lexical path from one directory to another

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first. Falls back to the path itself when
/// absolute, or the path joined onto the current directory.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            clean(path)
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| clean(&cwd.join(path)))
        }
    })
}

/// Fold `.` and `..` components lexically.
///
/// `..` past the root of an absolute path is dropped; on a relative path it
/// is kept.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// `base.join(path)` followed by [`clean`]. An absolute `path` replaces
/// `base`, as with [`Path::join`].
#[inline]
pub fn clean_join(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    clean(&base.join(path))
}

/// Lexical relative path from directory `from` to `to`.
///
/// Both paths should be absolute (or both relative to the same base).
/// Returns an empty path when they are equal.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = clean(from);
    let to = clean(to);
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &to[common..] {
        rel.push(component.as_os_str());
    }
    rel
}
