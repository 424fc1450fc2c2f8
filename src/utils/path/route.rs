//! URL reference utilities.

/// References left untouched by every rewrite: root-absolute paths, remote
/// URLs, inline data and CSS custom-property indirections.
#[inline]
pub fn is_passthrough_ref(reference: &str) -> bool {
    reference.starts_with('/')
        || reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("data:")
        || reference.starts_with("var(")
}

/// Split a URL into its path and the `?query` / `#fragment` suffix.
///
/// ```ignore
/// assert_eq!(split_path_suffix("a.woff?v=1#x"), ("a.woff", "?v=1#x"));
/// ```
#[inline]
pub fn split_path_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

/// Convert a relative filesystem path to URL form (forward slashes).
pub fn to_url_path(path: &std::path::Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
