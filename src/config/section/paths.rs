//! `[paths]` section configuration.
//!
//! Source and destination roots for every stage. All values are relative to
//! the project root and resolved once when the config is loaded.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! src = "./src"
//! dist = "./dist"
//!
//! [paths.html]
//! src = "./src/pages"
//! dest = "./dist/html"
//!
//! [paths.scss]
//! src = "./src/styles"
//! dest = "./dist/assets/css"
//! ```

use crate::utils::path::clean_join;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Define a `{ src, dest }` pair whose defaults depend on the pair.
macro_rules! dir_pair {
    ($(#[$meta:meta])* $name:ident, $src:literal, $dest:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub src: PathBuf,
            pub dest: PathBuf,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    src: PathBuf::from($src),
                    dest: PathBuf::from($dest),
                }
            }
        }

        impl $name {
            fn resolve(&mut self, root: &Path) {
                self.src = clean_join(root, &self.src);
                self.dest = clean_join(root, &self.dest);
            }
        }
    };
}

dir_pair!(
    /// Page documents.
    HtmlPaths, "./src/pages", "./dist/html"
);
dir_pair!(
    /// Style-sheet sources and compiled output.
    ScssPaths, "./src/styles", "./dist/assets/css"
);
dir_pair!(
    /// Scripts.
    JsPaths, "./src/scripts", "./dist/assets/js"
);
dir_pair!(
    /// Public static resources (fonts, images, favicon).
    PublicPaths, "./public", "./dist/assets"
);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source root (holds the root document and `templates/`).
    pub src: PathBuf,
    /// Output root.
    pub dist: PathBuf,
    pub html: HtmlPaths,
    pub scss: ScssPaths,
    pub js: JsPaths,
    pub public: PublicPaths,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("./src"),
            dist: PathBuf::from("./dist"),
            html: HtmlPaths::default(),
            scss: ScssPaths::default(),
            js: JsPaths::default(),
            public: PublicPaths::default(),
        }
    }
}

impl PathsConfig {
    pub(crate) fn resolve(&mut self, root: &Path) {
        self.src = clean_join(root, &self.src);
        self.dist = clean_join(root, &self.dist);
        self.html.resolve(root);
        self.scss.resolve(root);
        self.js.resolve(root);
        self.public.resolve(root);
    }

    /// Shared include directory watched alongside page sources.
    pub fn templates_dir(&self) -> PathBuf {
        self.src.join("templates")
    }
}
