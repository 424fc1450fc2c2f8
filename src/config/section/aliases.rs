//! `[pathAliases]` section configuration.
//!
//! Short URL prefixes standing in for output subdirectories.
//!
//! ```toml
//! [pathAliases]
//! assetsPath = "/assets"
//! pagesPath = "/html"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathAliases {
    /// Alias for the public asset output root.
    pub assets_path: String,
    /// Alias for the page output directory.
    pub pages_path: String,
}

impl Default for PathAliases {
    fn default() -> Self {
        Self {
            assets_path: "/assets".into(),
            pages_path: "/html".into(),
        }
    }
}

impl PathAliases {
    /// Assets alias without the leading slash (`assets`), used for the
    /// relative `./assets/` and `../assets/` forms.
    pub fn assets_segment(&self) -> &str {
        self.assets_path.trim_start_matches('/')
    }

    /// Pages alias without the leading slash (`html`).
    pub fn pages_segment(&self) -> &str {
        self.pages_path.trim_start_matches('/')
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        Self::validate_alias(
            &self.assets_path,
            FieldPath::new("pathAliases.assetsPath"),
            diag,
        );
        Self::validate_alias(
            &self.pages_path,
            FieldPath::new("pathAliases.pagesPath"),
            diag,
        );
        if self.assets_path == self.pages_path {
            diag.error(
                FieldPath::new("pathAliases.pagesPath"),
                "pages alias must differ from the assets alias",
            );
        }
    }

    fn validate_alias(alias: &str, field: FieldPath, diag: &mut ConfigDiagnostics) {
        if !alias.starts_with('/') || alias.len() < 2 {
            diag.error_with_hint(
                field,
                format!("alias `{alias}` must be an absolute URL path"),
                "e.g. \"/assets\"",
            );
        } else if alias.ends_with('/') {
            diag.error_with_hint(
                field,
                format!("alias `{alias}` must not end with `/`"),
                format!("use \"{}\"", alias.trim_end_matches('/')),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_alias_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.path_aliases.assets_path, "/assets");
        assert_eq!(config.path_aliases.pages_path, "/html");
    }

    #[test]
    fn test_alias_override() {
        let config = test_parse_config("[pathAliases]\nassetsPath = \"/static\"");
        assert_eq!(config.path_aliases.assets_path, "/static");
        assert_eq!(config.path_aliases.assets_segment(), "static");
        assert_eq!(config.path_aliases.pages_path, "/html");
    }

    #[test]
    fn test_alias_validation() {
        let aliases = PathAliases {
            assets_path: "assets".into(),
            pages_path: "/html/".into(),
        };
        let mut diag = ConfigDiagnostics::new();
        aliases.validate(&mut diag);
        assert_eq!(diag.errors().len(), 2);
    }

    #[test]
    fn test_alias_must_differ() {
        let aliases = PathAliases {
            assets_path: "/x".into(),
            pages_path: "/x".into(),
        };
        let mut diag = ConfigDiagnostics::new();
        aliases.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
    }
}
