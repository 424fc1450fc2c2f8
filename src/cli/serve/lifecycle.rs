//! Server lifecycle management.

use super::Site;
use crate::{log, utils::exec::Cmd};
use anyhow::{Context, Result, anyhow};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Worker threads answering HTTP requests.
const REQUEST_THREADS: usize = 4;

/// Bind to the interface and port, moving to the following ports while
/// they are taken.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Run the request loop on its own thread until the server is unblocked.
pub fn spawn_request_loop(server: Arc<Server>, site: Arc<Site>) -> Result<JoinHandle<()>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("http-{i}"))
        .build()
        .context("failed to create request thread pool")?;

    thread::Builder::new()
        .name("http-accept".into())
        .spawn(move || {
            for request in server.incoming_requests() {
                let site = Arc::clone(&site);
                pool.spawn(move || {
                    if let Err(e) = site.handle(request) {
                        log!("serve"; "request error: {e}");
                    }
                });
            }
        })
        .context("failed to spawn request thread")
}

/// Wait for the request thread to finish (max 2 seconds).
pub fn wait_for_request_loop(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Browser-facing URL for a bound address.
pub fn browser_url(addr: SocketAddr) -> String {
    let host = if addr.ip().is_unspecified() {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    } else {
        addr.ip()
    };
    format!("http://{}/", SocketAddr::new(host, addr.port()))
}

/// Open `url` in the system browser. Failure is only logged.
pub fn open_browser(url: &str) {
    let cmd = if cfg!(target_os = "macos") {
        Cmd::new("open").arg(url)
    } else if cfg!(target_os = "windows") {
        Cmd::new("cmd").args(["/C", "start", "", url])
    } else {
        Cmd::new("xdg-open").arg(url)
    };

    if let Err(e) = cmd.spawn_detached() {
        log!("serve"; "could not open browser: {e:#}");
    }
}
