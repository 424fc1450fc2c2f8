//! Re-target icon URLs inside inline `style` attributes.
//!
//! An inline `--icon-url: url(...)` is consumed by rules in the compiled
//! style-sheet, so its reference must be relative to the style-sheet's
//! directory rather than to the document.

use crate::debug;
use crate::utils::path::{clean_join, relative_path, route};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Custom property marking a style attribute for re-targeting.
const ICON_PROPERTY: &str = "--icon-url";

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)style\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\s*\(\s*["']?([^"')]+)["']?\s*\)"#).unwrap()
});

/// Existence check for output paths.
///
/// Paths under a mirrored output tree are answered from its source tree, so
/// the result does not depend on whether the copy has happened yet.
#[derive(Debug, Clone, Default)]
pub struct AssetLookup {
    /// `(output, source)` pairs, most specific first.
    mirrors: Vec<(PathBuf, PathBuf)>,
}

impl AssetLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer paths under `output` from `source`.
    pub fn mirror(mut self, output: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
        self.mirrors.push((output.into(), source.into()));
        self
    }

    pub fn exists(&self, path: &Path) -> bool {
        let mut mirrored = false;
        for (output, source) in &self.mirrors {
            let Ok(rest) = path.strip_prefix(output) else {
                continue;
            };
            mirrored = true;
            let candidate = if rest.as_os_str().is_empty() {
                source.clone()
            } else {
                source.join(rest)
            };
            if candidate.exists() {
                return true;
            }
        }
        !mirrored && path.exists()
    }
}

/// Rewrite relative `url(...)` references in `--icon-url` style attributes.
///
/// `doc_dir` is the directory of the document being rewritten and
/// `style_dir` the compiled style-sheet output directory. References that
/// are passthrough (absolute, remote, data, `var(`) or that `lookup` does
/// not find are left as is.
pub fn retarget_icon_urls<'a>(
    content: &'a str,
    doc_dir: &Path,
    style_dir: &Path,
    lookup: &AssetLookup,
) -> Cow<'a, str> {
    STYLE_ATTR.replace_all(content, |caps: &Captures<'_>| {
        let whole = &caps[0];
        let (body, quote) = match (caps.get(1), caps.get(2)) {
            (Some(m), _) => (m.as_str(), '"'),
            (None, Some(m)) => (m.as_str(), '\''),
            (None, None) => return whole.to_string(),
        };
        if !body.contains(ICON_PROPERTY) {
            return whole.to_string();
        }

        let rewritten = CSS_URL.replace_all(body, |url: &Captures<'_>| {
            let call = &url[0];
            let reference = url[1].trim();
            match retarget(reference, doc_dir, style_dir, lookup) {
                Some(target) => call.replacen(reference, &target, 1),
                None => call.to_string(),
            }
        });

        match rewritten {
            Cow::Borrowed(_) => whole.to_string(),
            Cow::Owned(body) => {
                debug!("rewrite"; "inline style url: {} -> {}", caps[0].chars().take(60).collect::<String>(), body);
                format!("style={quote}{body}{quote}")
            }
        }
    })
}

/// Path of `reference` (relative to `doc_dir`) as seen from `style_dir`.
fn retarget(
    reference: &str,
    doc_dir: &Path,
    style_dir: &Path,
    lookup: &AssetLookup,
) -> Option<String> {
    if route::is_passthrough_ref(reference) {
        return None;
    }
    let (path, suffix) = route::split_path_suffix(reference);
    let resolved = clean_join(doc_dir, path);
    if !lookup.exists(&resolved) {
        return None;
    }

    let relative = route::to_url_path(&relative_path(style_dir, &resolved));
    let target = if relative.starts_with("./") || relative.starts_with("../") {
        relative
    } else {
        format!("./{relative}")
    };
    Some(format!("{target}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// `dist/html` page, `dist/assets/css` style dir, icon at
    /// `dist/assets/img/icons/home.svg`.
    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/html")).unwrap();
        fs::create_dir_all(dir.path().join("dist/assets/css")).unwrap();
        fs::create_dir_all(dir.path().join("dist/assets/img/icons")).unwrap();
        fs::write(dir.path().join("dist/assets/img/icons/home.svg"), "<svg/>").unwrap();
        dir
    }

    #[test]
    fn test_retargets_existing_icon() {
        let dir = fixture();
        let doc_dir = dir.path().join("dist/html");
        let style_dir = dir.path().join("dist/assets/css");

        let html = r#"<i style="--icon-url: url('../assets/img/icons/home.svg')"></i>"#;
        let out = retarget_icon_urls(html, &doc_dir, &style_dir, &AssetLookup::default());
        assert_eq!(
            out,
            r#"<i style="--icon-url: url('../img/icons/home.svg')"></i>"#
        );
    }

    #[test]
    fn test_keeps_single_quotes() {
        let dir = fixture();
        let doc_dir = dir.path().join("dist");
        let style_dir = dir.path().join("dist/assets/css");

        let html = r#"<i style='--icon-url:url(assets/img/icons/home.svg)'></i>"#;
        let out = retarget_icon_urls(html, &doc_dir, &style_dir, &AssetLookup::default());
        assert_eq!(out, r#"<i style='--icon-url:url(../img/icons/home.svg)'></i>"#);
    }

    #[test]
    fn test_skips_passthrough_and_missing() {
        let dir = fixture();
        let doc_dir = dir.path().join("dist/html");
        let style_dir = dir.path().join("dist/assets/css");

        for html in [
            r#"<i style="--icon-url: url(/assets/img/icons/home.svg)"></i>"#,
            r#"<i style="--icon-url: url(https://cdn.example.com/a.svg)"></i>"#,
            r#"<i style="--icon-url: url(data:image/svg+xml;base64,AA)"></i>"#,
            r#"<i style="--icon-url: url(../assets/img/icons/missing.svg)"></i>"#,
        ] {
            assert_eq!(retarget_icon_urls(html, &doc_dir, &style_dir, &AssetLookup::default()), html);
        }
    }

    #[test]
    fn test_ignores_styles_without_icon_property() {
        let dir = fixture();
        let doc_dir = dir.path().join("dist/html");
        let style_dir = dir.path().join("dist/assets/css");

        let html = r#"<div style="background: url(../assets/img/icons/home.svg)"></div>"#;
        assert_eq!(retarget_icon_urls(html, &doc_dir, &style_dir, &AssetLookup::default()), html);
    }

    #[test]
    fn test_same_directory_gets_dot_prefix() {
        let dir = fixture();
        fs::write(dir.path().join("dist/assets/css/icon.svg"), "<svg/>").unwrap();
        let doc_dir = dir.path().join("dist");
        let style_dir = dir.path().join("dist/assets/css");

        let html = r#"<i style="--icon-url: url(assets/css/icon.svg?v=2)"></i>"#;
        let out = retarget_icon_urls(html, &doc_dir, &style_dir, &AssetLookup::default());
        assert_eq!(out, r#"<i style="--icon-url: url(./icon.svg?v=2)"></i>"#);
    }

    #[test]
    fn test_mirrored_source_decides() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let assets = dir.path().join("dist/assets");
        fs::create_dir_all(public.join("img")).unwrap();
        fs::write(public.join("img/home.svg"), "<svg/>").unwrap();
        fs::create_dir_all(assets.join("img")).unwrap();
        fs::write(assets.join("img/stale.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("dist/site.webmanifest"), "{}").unwrap();

        let lookup = AssetLookup::new().mirror(&assets, &public);
        // Not copied yet, present in the source tree.
        assert!(lookup.exists(&assets.join("img/home.svg")));
        // Left over in the output, gone from the source tree.
        assert!(!lookup.exists(&assets.join("img/stale.svg")));
        // Outside every mirror the output tree answers.
        assert!(lookup.exists(&dir.path().join("dist/site.webmanifest")));
    }

    #[test]
    fn test_mirrored_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("favicon.svg"), "<svg/>").unwrap();
        let lookup = AssetLookup::new().mirror(
            dir.path().join("dist/favicon.svg"),
            dir.path().join("favicon.svg"),
        );
        assert!(lookup.exists(&dir.path().join("dist/favicon.svg")));
    }

    #[test]
    fn test_retargets_before_copy() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("public/img")).unwrap();
        fs::write(dir.path().join("public/img/home.svg"), "<svg/>").unwrap();
        let doc_dir = dir.path().join("dist/html");
        let style_dir = dir.path().join("dist/assets/css");
        let lookup =
            AssetLookup::new().mirror(dir.path().join("dist/assets"), dir.path().join("public"));

        let html = r#"<i style="--icon-url: url(../assets/img/home.svg)"></i>"#;
        assert_eq!(
            retarget_icon_urls(html, &doc_dir, &style_dir, &lookup),
            r#"<i style="--icon-url: url(../img/home.svg)"></i>"#
        );
    }
}
