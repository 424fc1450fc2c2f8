//! Live reload.
//!
//! ```text
//! watch rebuild -> ReloadSink -> LiveReload (websocket) -> browser client
//! ```
//!
//! - `message` - JSON protocol (`css`, `reload`, `connected`)
//! - `server` - WebSocket acceptor and broadcaster

pub mod message;
pub mod server;

pub use server::{DEFAULT_WS_PORT, LiveReload};

/// Receiver of reload signals issued after watch rebuilds.
pub trait ReloadSink: Send + Sync {
    /// Swap one style-sheet (its output file name) without a full reload.
    fn reload_styles(&self, path: &str);

    fn reload_page(&self);
}
