//! URL to filesystem path resolution.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Resolve a request URL to a file under `serve_root`.
///
/// Directories resolve to their `index.html`. URLs containing `..` or
/// resolving outside the root (symlinks included) yield `None`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    let index = canonical.join("index.html");
    (canonical.is_dir() && index.is_file()).then_some(index)
}

/// Strip query and fragment, percent-decode, trim slashes.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    if decoded.contains('\\') {
        return None;
    }
    Some(decoded.trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::create_dir_all(dir.path().join("html/guide")).unwrap();
        fs::write(dir.path().join("html/about us.html"), "about").unwrap();
        fs::write(dir.path().join("html/guide/index.html"), "guide").unwrap();
        dir
    }

    #[test]
    fn test_root_serves_index() {
        let dir = site();
        let path = resolve_path("/", dir.path()).unwrap();
        assert!(path.ends_with("index.html"));
    }

    #[test]
    fn test_directory_serves_index() {
        let dir = site();
        let path = resolve_path("/html/guide/", dir.path()).unwrap();
        assert!(path.ends_with("html/guide/index.html"));
    }

    #[test]
    fn test_percent_decoding_and_query() {
        let dir = site();
        let path = resolve_path("/html/about%20us.html?v=2#top", dir.path()).unwrap();
        assert!(path.ends_with("about us.html"));
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = site();
        assert!(resolve_path("/../etc/passwd", dir.path()).is_none());
        assert!(resolve_path("/html/%2e%2e/%2e%2e/secret", dir.path()).is_none());
        assert!(resolve_path("/html/..%5c..%5csecret", dir.path()).is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = site();
        assert!(resolve_path("/html/missing.html", dir.path()).is_none());
        assert!(resolve_path("/html/", dir.path()).is_none());
    }
}
