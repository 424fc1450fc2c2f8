//! Style-sheet URL flip for distributable builds.

use super::rule::{RewriteRule, literal};
use crate::utils::path::{relative_path, route};
use regex::escape;
use std::borrow::Cow;
use std::path::Path;

/// Rewrites `url(<quote?>{assets}/...)` to `url(<quote?>{prefix}...)`.
#[derive(Debug, Clone)]
pub struct CssFlip {
    assets_alias: String,
}

impl CssFlip {
    pub fn new(assets_alias: &str) -> Self {
        Self {
            assets_alias: assets_alias.to_owned(),
        }
    }

    /// Replace the assets alias in every `url(...)` with `prefix`, keeping
    /// the original quote character.
    pub fn flip<'a>(&self, css: &'a str, prefix: &str) -> Result<Cow<'a, str>, regex::Error> {
        let rule = RewriteRule::new(
            &format!(r#"url\(\s*(["']?){}/"#, escape(&self.assets_alias)),
            format!("url(${{1}}{}", literal(prefix)),
        )?;
        Ok(rule.apply(Cow::Borrowed(css)))
    }

    /// True when `css` still references the assets alias through `url(...)`.
    pub fn has_alias_urls(&self, css: &str) -> bool {
        let needle = self.assets_alias.as_str();
        ["url(", "url(\"", "url('"]
            .iter()
            .any(|open| css.contains(&format!("{open}{needle}/")))
    }
}

/// Prefix reaching `public_dest` from the directory of `css_file`, always
/// ending in `/`.
///
/// With the default layout a style-sheet directly under the style output
/// root gets `../`, one nested a level deeper `../../`.
pub fn relative_prefix(css_file: &Path, public_dest: &Path) -> String {
    let css_dir = css_file.parent().unwrap_or(Path::new(""));
    let relative = route::to_url_path(&relative_path(css_dir, public_dest));
    if relative.is_empty() {
        "./".to_owned()
    } else {
        format!("{relative}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_keeps_quotes() {
        let flip = CssFlip::new("/assets");
        let css = r#".a{background:url(/assets/img/a.png)}
.b{background:url("/assets/img/b.png")}
.c{src:url('/assets/fonts/c.woff2')}"#;
        let out = flip.flip(css, "../").unwrap();
        assert_eq!(
            out,
            r#".a{background:url(../img/a.png)}
.b{background:url("../img/b.png")}
.c{src:url('../fonts/c.woff2')}"#
        );
        assert!(!flip.has_alias_urls(&out));
        assert!(flip.has_alias_urls(css));
    }

    #[test]
    fn test_flip_leaves_other_urls() {
        let flip = CssFlip::new("/assets");
        let css = ".a{background:url(/other/a.png)} .b{background:url(data:image/png;base64,AA)}";
        assert_eq!(flip.flip(css, "../").unwrap(), css);
    }

    #[test]
    fn test_relative_prefix_depth() {
        let public = Path::new("/site/dist/assets");
        assert_eq!(
            relative_prefix(Path::new("/site/dist/assets/css/styles.css"), public),
            "../"
        );
        assert_eq!(
            relative_prefix(Path::new("/site/dist/assets/css/pages/home.css"), public),
            "../../"
        );
        assert_eq!(relative_prefix(Path::new("/site/dist/assets/x.css"), public), "./");
    }
}
