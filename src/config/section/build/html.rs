//! `[build.html]` include preprocessor settings.
//!
//! # Example
//!
//! ```toml
//! [build.html]
//! prefix = "@@"
//! basepath = "@file"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::clean_join;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlBuildConfig {
    /// Marker token for `include(...)` directives and variables.
    pub prefix: String,

    /// Where include paths are resolved from.
    /// `@file` = the including document's directory, `@root` = project root,
    /// anything else is a directory relative to the project root.
    pub basepath: String,

    #[serde(skip)]
    root: PathBuf,
}

impl Default for HtmlBuildConfig {
    fn default() -> Self {
        Self {
            prefix: "@@".into(),
            basepath: "@file".into(),
            root: PathBuf::new(),
        }
    }
}

/// Resolved include base-path mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeBase {
    /// Relative to the file containing the directive.
    File,
    /// Fixed directory (project root or a configured directory).
    Dir(PathBuf),
}

impl HtmlBuildConfig {
    pub(crate) fn resolve(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }

    /// Resolved include base.
    pub fn include_base(&self) -> IncludeBase {
        match self.basepath.as_str() {
            "@file" => IncludeBase::File,
            "@root" => IncludeBase::Dir(self.root.clone()),
            dir => IncludeBase::Dir(clean_join(&self.root, dir)),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.prefix.trim().is_empty() {
            diag.error(
                FieldPath::new("build.html.prefix"),
                "include prefix must not be empty",
            );
        }
        if self.basepath.trim().is_empty() {
            diag.error_with_hint(
                FieldPath::new("build.html.basepath"),
                "basepath must not be empty",
                "use \"@file\" or \"@root\"",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_html_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.html.prefix, "@@");
        assert_eq!(config.build.html.basepath, "@file");
    }

    #[test]
    fn test_include_base_modes() {
        let mut html = HtmlBuildConfig::default();
        html.resolve(Path::new("/site"));
        assert_eq!(html.include_base(), IncludeBase::File);

        html.basepath = "@root".into();
        assert_eq!(html.include_base(), IncludeBase::Dir(PathBuf::from("/site")));

        html.basepath = "./src/templates".into();
        assert_eq!(
            html.include_base(),
            IncludeBase::Dir(PathBuf::from("/site/src/templates"))
        );
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let mut html = HtmlBuildConfig::default();
        html.prefix = " ".into();
        let mut diag = ConfigDiagnostics::new();
        html.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
