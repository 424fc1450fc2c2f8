//! Change classification: raw notify events to subscriptions.

use super::Subscription;
use crate::config::SiteConfig;
use crate::utils::path::normalize_path;
use crate::utils::walk::has_extension;
use notify::EventKind;
use notify::event::ModifyKind;
use std::path::{Path, PathBuf};

/// Path patterns for the three subscriptions.
#[derive(Debug, Clone)]
pub(super) struct WatchPatterns {
    style_root: PathBuf,
    root_document: PathBuf,
    page_dir: PathBuf,
    template_dir: PathBuf,
    asset_dirs: Vec<PathBuf>,
    favicon: PathBuf,
}

impl WatchPatterns {
    pub(super) fn new(config: &SiteConfig) -> Self {
        let paths = &config.paths;
        Self {
            style_root: paths.scss.src.clone(),
            root_document: config.root_document_src(),
            page_dir: paths.html.src.clone(),
            template_dir: paths.templates_dir(),
            asset_dirs: vec![
                paths.public.src.join("fonts"),
                paths.public.src.join("img"),
                paths.js.src.clone(),
            ],
            favicon: config.favicon_src(),
        }
    }

    /// Subscriptions interested in `path`.
    pub(super) fn classify(&self, path: &Path) -> Vec<Subscription> {
        let mut matched = Vec::new();
        if self.is_style(path) {
            matched.push(Subscription::Styles);
        }
        if self.is_markup(path) {
            matched.push(Subscription::Markup);
        }
        if self.is_asset(path) {
            matched.push(Subscription::Assets);
        }
        matched
    }

    fn is_style(&self, path: &Path) -> bool {
        path.starts_with(&self.style_root) && has_extension(path, &["scss"])
    }

    fn is_markup(&self, path: &Path) -> bool {
        if path == self.root_document {
            return true;
        }
        if !has_extension(path, &["html"]) {
            return false;
        }
        path.parent() == Some(self.page_dir.as_path()) || path.starts_with(&self.template_dir)
    }

    fn is_asset(&self, path: &Path) -> bool {
        if path.starts_with(&self.style_root) {
            return false;
        }
        path == self.favicon || self.asset_dirs.iter().any(|dir| path.starts_with(dir))
    }

    /// Directories to watch recursively, with nested duplicates removed.
    pub(super) fn roots(&self) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = [
            self.style_root.clone(),
            self.page_dir.clone(),
            self.template_dir.clone(),
        ]
        .into_iter()
        .chain(self.root_document.parent().map(Path::to_path_buf))
        .chain(self.favicon.parent().map(Path::to_path_buf))
        .chain(self.asset_dirs.iter().cloned())
        .collect();
        candidates.sort();
        candidates.dedup();

        let mut roots: Vec<PathBuf> = Vec::new();
        for path in candidates {
            if !roots.iter().any(|root| path.starts_with(root)) {
                roots.push(path);
            }
        }
        roots
    }
}

/// Paths of a notify event worth a rebuild. Metadata-only changes and
/// editor artifacts are dropped.
pub(super) fn relevant_paths(event: &notify::Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => {}
        EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => {}
        _ => return Vec::new(),
    }
    event
        .paths
        .iter()
        .filter(|path| !is_temp_file(path))
        .map(|path| normalize_path(path))
        .collect()
}

/// Check if path is a temp/backup file (editor artifacts).
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "swx" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name == "4913"
}
