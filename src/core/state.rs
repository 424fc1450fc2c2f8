//! Process-wide shutdown state.
//!
//! - `SHUTDOWN`: Ctrl+C received
//! - `SERVER`: HTTP server to unblock on shutdown

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};

use tiny_http::Server;
use tokio::sync::Notify;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Wakes the async side (watch loop) on shutdown.
static SHUTDOWN_NOTIFY: LazyLock<Notify> = LazyLock::new(Notify::new);

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// - Before `register_server()`: exit immediately
/// - After `register_server()`: unblock the server and wake the watch loop
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SERVER.get().is_some() {
            crate::log!("serve"; "shutting down...");
            request_shutdown();
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown.
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Flag shutdown, unblock the server and wake [`wait_for_shutdown`].
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    if let Some(server) = SERVER.get() {
        server.unblock();
    }
    SHUTDOWN_NOTIFY.notify_one();
}

/// Relaxed: a few more items processed before stopping is fine.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Resolve once shutdown has been requested.
pub async fn wait_for_shutdown() {
    while !SHUTDOWN.load(Ordering::SeqCst) {
        SHUTDOWN_NOTIFY.notified().await;
    }
}
