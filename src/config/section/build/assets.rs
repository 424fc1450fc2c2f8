//! `[build.assets]` asset mirroring settings.

use crate::utils::path::clean_join;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetsBuildConfig {
    /// Directory of a third-party icon-font package whose `*.woff*` files
    /// are copied to `fonts/material-icons/`.
    pub icon_fonts: PathBuf,
}

impl Default for AssetsBuildConfig {
    fn default() -> Self {
        Self {
            icon_fonts: PathBuf::from("node_modules/material-icons/iconfont"),
        }
    }
}

impl AssetsBuildConfig {
    pub(crate) fn resolve(&mut self, root: &Path) {
        self.icon_fonts = clean_join(root, &self.icon_fonts);
    }
}
