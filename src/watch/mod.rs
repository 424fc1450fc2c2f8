//! File watching for the dev server.
//!
//! ```text
//! notify → bridge thread → classifier → styles  (200ms) ┐
//!                                     → markup  (300ms) ├→ rebuild → ReloadSink
//!                                     → assets  (300ms) ┘
//! ```
//!
//! Each subscription runs in its own task with its own debounce window, so
//! a style edit never waits on a page rebuild. Rebuild errors go to the
//! watch status line; the watcher keeps running.

mod classifier;
mod debouncer;

#[cfg(test)]
mod tests;

use crate::config::SiteConfig;
use crate::core::{PathMode, wait_for_shutdown};
use crate::logger::{status_error, status_success, status_warning};
use crate::pipeline::Orchestrator;
use crate::reload::ReloadSink;
use crate::{debug, log};
use anyhow::Result;
use classifier::{WatchPatterns, relevant_paths};
use debouncer::debounce;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Interval for re-attaching watch roots that were missing or recreated.
const ROOT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// A group of source paths sharing one rebuild action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    Styles,
    Markup,
    Assets,
}

impl Subscription {
    pub const ALL: [Self; 3] = [Self::Styles, Self::Markup, Self::Assets];

    pub const fn delay(self) -> Duration {
        match self {
            Self::Styles => Duration::from_millis(200),
            Self::Markup | Self::Assets => Duration::from_millis(300),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Markup => "pages",
            Self::Assets => "assets",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Styles => 0,
            Self::Markup => 1,
            Self::Assets => 2,
        }
    }
}

pub struct WatchOrchestrator {
    orchestrator: Orchestrator,
    reload: Arc<dyn ReloadSink>,
}

impl WatchOrchestrator {
    pub fn new(orchestrator: Orchestrator, reload: Arc<dyn ReloadSink>) -> Self {
        Self {
            orchestrator,
            reload,
        }
    }

    /// Watch sources until shutdown is requested.
    pub async fn run(self) -> Result<()> {
        let config = Arc::clone(self.orchestrator.config());
        let patterns = WatchPatterns::new(&config);
        let roots = patterns.roots();

        // notify calls back on its own thread; forward through a channel.
        let (event_tx, event_rx) = crossbeam::channel::unbounded();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })?;
        let mut attached = FxHashSet::default();
        attach_roots(&mut watcher, &roots, &mut attached);
        for root in roots.iter().filter(|r| !attached.contains(*r)) {
            log!("warning"; "watch root not found: {}", config.root_relative(root).display());
        }

        let (path_tx, mut path_rx) = mpsc::channel::<PathBuf>(256);
        std::thread::Builder::new()
            .name("watch-bridge".into())
            .spawn(move || {
                while let Ok(result) = event_rx.recv() {
                    match result {
                        Ok(event) => {
                            for path in relevant_paths(&event) {
                                if path_tx.blocking_send(path).is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) => log!("watch"; "notify error: {e}"),
                    }
                }
            })?;

        let triggers = Subscription::ALL.map(|sub| self.subscribe(sub));
        log!("watch"; "watching {} for changes", describe_roots(&config, &attached));

        let mut shutdown = std::pin::pin!(wait_for_shutdown());
        let mut root_check = tokio::time::interval(ROOT_CHECK_INTERVAL);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(path) = path_rx.recv() => {
                    for sub in patterns.classify(&path) {
                        debug!("watch"; "{} <- {}", sub.label(), config.root_relative(&path).display());
                        forward(&triggers[sub.index()], path.clone());
                    }
                }
                _ = root_check.tick() => attach_roots(&mut watcher, &roots, &mut attached),
            }
        }

        debug!("watch"; "stopped");
        Ok(())
    }

    /// Start the debounce task for `sub` and return its trigger.
    fn subscribe(&self, sub: Subscription) -> mpsc::Sender<PathBuf> {
        let (tx, rx) = mpsc::channel(64);
        let orchestrator = self.orchestrator.clone();
        let reload = Arc::clone(&self.reload);

        tokio::spawn(debounce(rx, sub.delay(), move |changes| {
            let orchestrator = orchestrator.clone();
            let reload = Arc::clone(&reload);
            async move { rebuild(sub, &orchestrator, reload.as_ref(), &changes).await }
        }));
        tx
    }
}

/// Queue `path` for a subscription without waiting.
///
/// A full queue already holds changes its debounce task has yet to drain,
/// which guarantees a rebuild; the path is dropped rather than stalling the
/// other subscriptions and the shutdown check.
fn forward(trigger: &mpsc::Sender<PathBuf>, path: PathBuf) -> bool {
    match trigger.try_send(path) {
        Ok(()) => true,
        Err(TrySendError::Full(path)) => {
            debug!("watch"; "rebuild pending, dropped {}", path.display());
            false
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

/// Watch roots that exist and are not attached yet; forget roots that
/// disappeared so they are re-attached once recreated.
fn attach_roots(
    watcher: &mut RecommendedWatcher,
    roots: &[PathBuf],
    attached: &mut FxHashSet<PathBuf>,
) {
    attached.retain(|path| path.exists());
    for root in roots {
        if attached.contains(root) || !root.is_dir() {
            continue;
        }
        match watcher.watch(root, RecursiveMode::Recursive) {
            Ok(()) => {
                debug!("watch"; "attached {}", root.display());
                attached.insert(root.clone());
            }
            Err(e) => debug!("watch"; "cannot watch {}: {e}", root.display()),
        }
    }
}

fn describe_roots(config: &SiteConfig, attached: &FxHashSet<PathBuf>) -> String {
    let mut names: Vec<_> = attached
        .iter()
        .map(|root| config.root_relative(root).display().to_string())
        .collect();
    names.sort();
    names.join(", ")
}

/// Re-run the stage behind `sub` and signal the browser.
pub async fn rebuild(
    sub: Subscription,
    orchestrator: &Orchestrator,
    reload: &dyn ReloadSink,
    changes: &[PathBuf],
) {
    let config = orchestrator.config();
    log!("watch"; "{} changed: {}", sub.label(), describe_changes(config, changes));

    match sub {
        Subscription::Styles => match orchestrator.build_styles().await {
            Ok(report) => {
                if config.style_output().exists() {
                    reload.reload_styles(&config.files.scss.output);
                } else {
                    reload.reload_page();
                }
                if report.missing.is_empty() {
                    status_success("styles rebuilt");
                } else {
                    status_warning(&format!("{} style-sheet(s) not produced", report.missing.len()));
                }
            }
            Err(e) => status_error("style build failed", &format!("{:#}", anyhow::Error::from(e))),
        },
        Subscription::Markup => match orchestrator.build_markup(PathMode::DevelopmentAbsolute).await {
            Ok(_) => {
                reload.reload_page();
                status_success("pages rebuilt");
            }
            Err(e) => status_error("page build failed", &format!("{:#}", anyhow::Error::from(e))),
        },
        Subscription::Assets => {
            let total = orchestrator.build_assets().await.total();
            reload.reload_page();
            if total.failed > 0 {
                status_warning(&format!("{} asset(s) failed to copy", total.failed));
            } else {
                status_success("assets copied");
            }
        }
    }
}

fn describe_changes(config: &SiteConfig, changes: &[PathBuf]) -> String {
    const SHOWN: usize = 3;
    let mut names: Vec<_> = changes
        .iter()
        .take(SHOWN)
        .map(|p| config.root_relative(p).display().to_string())
        .collect();
    if changes.len() > SHOWN {
        names.push(format!("+{} more", changes.len() - SHOWN));
    }
    names.join(", ")
}
