//! Directory walking.

use jwalk::WalkDir;
use std::path::{Path, PathBuf};

/// OS metadata files never treated as content.
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// All regular files under `dir`, in sorted order. A missing directory
/// yields an empty list.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

/// Files under `dir` whose extension is one of `exts` (without dot).
pub fn collect_files_with_ext(dir: &Path, exts: &[&str]) -> Vec<PathBuf> {
    collect_files(dir)
        .into_iter()
        .filter(|p| has_extension(p, exts))
        .collect()
}

/// Direct children of `dir` (not recursive) with one of `exts`, sorted.
pub fn list_files_with_ext(dir: &Path, exts: &[&str]) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, exts))
        .collect();
    files.sort();
    files
}

pub fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| exts.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}
