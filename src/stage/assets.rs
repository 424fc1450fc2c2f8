//! Static asset mirroring.
//!
//! Every copy is independent: a failed file is logged and counted, the
//! rest of the category continues. Fonts and images are mirrored, so their
//! destination directories are cleared first.

use crate::config::SiteConfig;
use crate::utils::plural::plural_count;
use crate::utils::walk::{collect_files, collect_files_with_ext, has_extension, list_files_with_ext};
use crate::{debug, log};
use std::io;
use std::path::{Path, PathBuf};

/// Image-directory files that are sources rather than assets.
const IMAGE_EXCLUDED: &[&str] = &["scss", "js"];

/// Per-category copy tally.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyCount {
    pub copied: usize,
    pub failed: usize,
}

impl CopyCount {
    fn add(&mut self, other: CopyCount) {
        self.copied += other.copied;
        self.failed += other.failed;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetReport {
    pub scripts: CopyCount,
    pub fonts: CopyCount,
    pub icon_fonts: CopyCount,
    pub favicon: CopyCount,
    pub images: CopyCount,
}

impl AssetReport {
    pub fn total(&self) -> CopyCount {
        let mut total = CopyCount::default();
        for count in [self.scripts, self.fonts, self.icon_fonts, self.favicon, self.images] {
            total.add(count);
        }
        total
    }
}

pub struct AssetStage<'a> {
    config: &'a SiteConfig,
}

impl<'a> AssetStage<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Copy every category. Fonts and icon fonts share a destination, so
    /// they run in order; the other categories run alongside.
    pub async fn run(&self) -> AssetReport {
        let fonts = async {
            let fonts = self.copy_fonts().await;
            (fonts, self.copy_icon_fonts().await)
        };
        let (scripts, (fonts, icon_fonts), favicon, images) = tokio::join!(
            self.copy_scripts(),
            fonts,
            self.copy_favicon(),
            self.copy_images(),
        );

        let report = AssetReport {
            scripts,
            fonts,
            icon_fonts,
            favicon,
            images,
        };
        let total = report.total();
        if total.failed > 0 {
            log!("warning"; "assets: {} copied, {} failed", total.copied, total.failed);
        } else {
            log!("assets"; "copied {}", plural_count(total.copied, "file"));
        }
        report
    }

    /// `{js.src}/**/*.js` flattened into `{js.dest}`.
    pub async fn copy_scripts(&self) -> CopyCount {
        let paths = &self.config.paths.js;
        if !self.source_exists(&paths.src, "script") {
            return CopyCount::default();
        }
        let pairs = collect_files_with_ext(&paths.src, &["js"])
            .into_iter()
            .filter_map(|src| {
                let dest = paths.dest.join(src.file_name()?);
                Some((src, dest))
            })
            .collect();
        self.copy_all(pairs).await
    }

    /// Mirror `{public.src}/fonts` into `{public.dest}/fonts`.
    pub async fn copy_fonts(&self) -> CopyCount {
        let public = &self.config.paths.public;
        self.mirror(&public.src.join("fonts"), &public.dest.join("fonts"), "font", |_| true)
            .await
    }

    /// `*.woff` / `*.woff2` from the icon-font package.
    pub async fn copy_icon_fonts(&self) -> CopyCount {
        let src = &self.config.build.assets.icon_fonts;
        if !self.source_exists(src, "icon font") {
            return CopyCount::default();
        }
        let dest = self.config.paths.public.dest.join("fonts/material-icons");
        let pairs = list_files_with_ext(src, &["woff", "woff2"])
            .into_iter()
            .filter_map(|file| {
                let target = dest.join(file.file_name()?);
                Some((file, target))
            })
            .collect();
        self.copy_all(pairs).await
    }

    pub async fn copy_favicon(&self) -> CopyCount {
        let src = self.config.favicon_src();
        if !src.is_file() {
            log!("warning"; "favicon not found: {}", self.config.root_relative(&src).display());
            return CopyCount::default();
        }
        self.copy_all(vec![(src, self.config.favicon_out())]).await
    }

    /// Mirror `{public.src}/img` into `{public.dest}/img`, skipping
    /// style and script sources.
    pub async fn copy_images(&self) -> CopyCount {
        let public = &self.config.paths.public;
        self.mirror(&public.src.join("img"), &public.dest.join("img"), "image", |path| {
            !has_extension(path, IMAGE_EXCLUDED)
        })
        .await
    }

    async fn mirror(
        &self,
        src: &Path,
        dest: &Path,
        kind: &str,
        keep: impl Fn(&Path) -> bool,
    ) -> CopyCount {
        if !self.source_exists(src, kind) {
            return CopyCount::default();
        }
        self.clear(dest).await;
        let pairs = collect_files(src)
            .into_iter()
            .filter(|file| keep(file.as_path()))
            .filter_map(|file| {
                let target = dest.join(file.strip_prefix(src).ok()?);
                Some((file, target))
            })
            .collect();
        self.copy_all(pairs).await
    }

    fn source_exists(&self, dir: &Path, kind: &str) -> bool {
        if dir.is_dir() {
            return true;
        }
        log!("warning"; "{kind} directory not found: {}", self.config.root_relative(dir).display());
        false
    }

    async fn clear(&self, dir: &Path) {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => debug!("assets"; "cleared {}", self.config.root_relative(dir).display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                log!("warning"; "failed to clear {}: {e}", self.config.root_relative(dir).display());
            }
        }
    }

    async fn copy_all(&self, pairs: Vec<(PathBuf, PathBuf)>) -> CopyCount {
        let mut count = CopyCount::default();
        for (src, dest) in pairs {
            match copy_file(&src, &dest).await {
                Ok(_) => count.copied += 1,
                Err(e) => {
                    log!("warning"; "failed to copy {}: {e}", self.config.root_relative(&src).display());
                    count.failed += 1;
                }
            }
        }
        count
    }
}

async fn copy_file(src: &Path, dest: &Path) -> io::Result<u64> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(src, dest).await
}
