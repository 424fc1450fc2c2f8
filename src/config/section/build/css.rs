//! `[build.css]` style compiler settings.
//!
//! # Example
//!
//! ```toml
//! [build.css]
//! loadPaths = ["./node_modules", "./src/styles"]
//! includePaths = ["./node_modules"]   # legacy name, used when loadPaths is empty
//! ```

use crate::utils::path::clean_join;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CssBuildConfig {
    /// Search paths for `@use` / `@import`.
    pub load_paths: Vec<PathBuf>,

    /// Legacy alias for `loadPaths`.
    pub include_paths: Vec<PathBuf>,
}

impl Default for CssBuildConfig {
    fn default() -> Self {
        let paths = vec![PathBuf::from("./node_modules"), PathBuf::from("./src/styles")];
        Self {
            load_paths: paths.clone(),
            include_paths: paths,
        }
    }
}

impl CssBuildConfig {
    pub(crate) fn resolve(&mut self, root: &Path) {
        for path in self.load_paths.iter_mut().chain(self.include_paths.iter_mut()) {
            *path = clean_join(root, &*path);
        }
    }

    /// Search-path list passed to the compiler, always ending with the
    /// style source root.
    pub fn search_paths(&self, style_root: &Path, root: &Path) -> Vec<PathBuf> {
        let mut paths = if !self.load_paths.is_empty() {
            self.load_paths.clone()
        } else if !self.include_paths.is_empty() {
            self.include_paths.clone()
        } else {
            vec![style_root.to_path_buf(), root.join("node_modules")]
        };
        paths.push(style_root.to_path_buf());
        paths
    }
}
