//! `[build]` section configuration.
//!
//! Settings handed to the build collaborators: the include preprocessor,
//! the style compiler and the asset mirror.
//!
//! # Example
//!
//! ```toml
//! [build.html]
//! prefix = "@@"               # Include/variable marker token
//! basepath = "@file"          # Include resolution: @file | @root | <dir>
//!
//! [build.css]
//! loadPaths = ["./node_modules", "./src/styles"]
//!
//! [build.assets]
//! iconFonts = "node_modules/material-icons/iconfont"
//! ```
//!
//! See submodules for detailed options: [`html`], [`css`], [`assets`].

pub mod assets;
pub mod css;
pub mod html;

pub use assets::AssetsBuildConfig;
pub use css::CssBuildConfig;
pub use html::{HtmlBuildConfig, IncludeBase};

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Include preprocessor settings.
    pub html: HtmlBuildConfig,

    /// Style compiler settings.
    pub css: CssBuildConfig,

    /// Asset mirroring settings.
    pub assets: AssetsBuildConfig,
}

impl BuildSectionConfig {
    /// Resolve all path fields against the project root.
    pub(crate) fn resolve(&mut self, root: &Path) {
        self.html.resolve(root);
        self.css.resolve(root);
        self.assets.resolve(root);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.html.validate(diag);
    }
}
