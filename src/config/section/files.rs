//! `[files]` section configuration.
//!
//! ```toml
//! [files]
//! favicon = "favicon.svg"
//!
//! [files.scss]
//! entry = "styles.scss"
//! output = "styles.css"
//!
//! [files.html]
//! index = "index.html"
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScssFiles {
    /// Primary style entry (relative to the style source root). Compiled
    /// before the other entries.
    pub entry: String,
    /// Primary compiled style-sheet (relative to the style output root).
    pub output: String,
}

impl Default for ScssFiles {
    fn default() -> Self {
        Self {
            entry: "styles.scss".into(),
            output: "styles.css".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlFiles {
    /// Root document name (under `paths.src`, emitted at `paths.dist`).
    pub index: String,
}

impl Default for HtmlFiles {
    fn default() -> Self {
        Self {
            index: "index.html".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub scss: ScssFiles,
    pub html: HtmlFiles,
    /// Favicon file name (under `paths.public.src`, emitted at `paths.dist`).
    pub favicon: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            scss: ScssFiles::default(),
            html: HtmlFiles::default(),
            favicon: "favicon.svg".into(),
        }
    }
}

impl FilesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        Self::validate_name(&self.favicon, FieldPath::new("files.favicon"), diag);
        Self::validate_name(&self.html.index, FieldPath::new("files.html.index"), diag);
        if !self.html.index.ends_with(".html") {
            diag.error(
                FieldPath::new("files.html.index"),
                "root document must be an .html file",
            );
        }
    }

    fn validate_name(name: &str, field: FieldPath, diag: &mut ConfigDiagnostics) {
        if name.is_empty() || name.contains(['/', '\\']) {
            diag.error(field, format!("`{name}` must be a plain file name"));
        }
    }
}
