//! Development server with live reload support.
//!
//! ```text
//! development build ─► websocket ─► http thread ─► watcher (until Ctrl+C)
//! ```

mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    config::SiteConfig,
    core::{PathMode, is_shutdown, register_server, request_shutdown},
    embed::serve::{ReloadVars, reload_script},
    log,
    logger::status_error,
    pipeline::Orchestrator,
    reload::{DEFAULT_WS_PORT, LiveReload},
    watch::WatchOrchestrator,
};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tiny_http::{Method, Request};

/// What the request handlers need: the output tree and the client script.
pub struct Site {
    root: PathBuf,
    script: String,
}

impl Site {
    pub fn new(root: PathBuf, reload: &ReloadVars) -> Self {
        Self {
            root,
            script: reload_script(reload),
        }
    }

    /// Handle a single HTTP request.
    fn handle(&self, request: Request) -> Result<()> {
        if is_shutdown() {
            return response::respond_unavailable(request);
        }
        if !matches!(request.method(), Method::Get | Method::Head) {
            return response::respond_method_not_allowed(request);
        }

        match path::resolve_path(request.url(), &self.root) {
            Some(file) => response::respond_file(request, &file, &self.script),
            None => response::respond_not_found(request, &self.root, &self.script),
        }
    }
}

/// Build for development, serve the output tree and rebuild on change.
///
/// A failing initial build is reported and serving continues, so the next
/// source change can recover.
pub async fn serve_site(config: Arc<SiteConfig>) -> Result<()> {
    let orchestrator = Orchestrator::new(Arc::clone(&config))?;
    if let Err(e) = orchestrator.build(PathMode::DevelopmentAbsolute).await {
        status_error("initial build failed", &format!("{e:#}"));
    }

    let reload = Arc::new(LiveReload::start(config.dev.host, DEFAULT_WS_PORT)?);
    let site = Arc::new(Site::new(
        config.paths.dist.clone(),
        &ReloadVars {
            ws_port: reload.port(),
            notify: config.dev.notify,
        },
    ));

    let (server, addr) = lifecycle::bind_with_retry(config.dev.host, config.dev.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));
    let http = lifecycle::spawn_request_loop(server, site)?;

    let url = lifecycle::browser_url(addr);
    log!("serve"; "{url}");
    if config.dev.open {
        lifecycle::open_browser(&url);
    }

    let watched = WatchOrchestrator::new(orchestrator, reload).run().await;

    // The watcher may also stop on its own error.
    request_shutdown();
    lifecycle::wait_for_request_loop(http);
    watched
}
