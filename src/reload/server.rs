//! WebSocket broadcaster for live reload.
//!
//! An acceptor thread performs handshakes and registers clients; a reader
//! thread drains client frames and prunes closed connections. Broadcasts
//! happen on the caller's thread.

use super::ReloadSink;
use super::message::ReloadMessage;
use crate::{debug, log};
use anyhow::Result;
use parking_lot::Mutex;
use std::io;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

/// Default WebSocket port.
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Maximum port retry attempts.
const MAX_PORT_RETRIES: u16 = 10;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Connected browser clients.
pub struct LiveReload {
    clients: Clients,
    port: u16,
}

impl LiveReload {
    /// Bind `host:base_port` (or a following port) and start accepting.
    pub fn start(host: IpAddr, base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(host, base_port, MAX_PORT_RETRIES)?;
        listener.set_nonblocking(true)?;

        let clients: Clients = Arc::default();
        let acceptor = Arc::clone(&clients);
        thread::Builder::new()
            .name("reload-accept".into())
            .spawn(move || accept_loop(listener, acceptor))?;
        let reader = Arc::clone(&clients);
        thread::Builder::new()
            .name("reload-read".into())
            .spawn(move || reader_loop(reader))?;

        debug!("reload"; "websocket listening on port {port}");
        Ok(Self { clients, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send to every client, dropping those that fail.
    pub fn broadcast(&self, message: &ReloadMessage) {
        let frame = Message::Text(message.to_json().into());
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            debug!("reload"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {e}");
                false
            }
        });
        debug!("reload"; "broadcast to {} client(s)", clients.len());
    }
}

impl ReloadSink for LiveReload {
    fn reload_styles(&self, path: &str) {
        log!("reload"; "styles: {path}");
        self.broadcast(&ReloadMessage::css(path));
    }

    fn reload_page(&self) {
        log!("reload"; "page");
        self.broadcast(&ReloadMessage::Reload);
    }
}

fn accept_loop(listener: TcpListener, clients: Clients) {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("reload"; "client connected: {addr}");
                // Handshake in blocking mode, poll reads afterwards.
                let _ = stream.set_nonblocking(false);
                match tungstenite::accept(stream) {
                    Ok(mut ws) => {
                        let _ = ws.get_ref().set_nonblocking(true);
                        let hello = Message::Text(ReloadMessage::connected().to_json().into());
                        if ws.send(hello).is_ok() {
                            clients.lock().push(ws);
                        }
                    }
                    Err(e) => debug!("reload"; "handshake failed: {e}"),
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                log!("reload"; "accept error: {e}");
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

fn reader_loop(clients: Clients) {
    loop {
        thread::sleep(POLL_INTERVAL);
        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == io::ErrorKind::WouldBlock => true,
            Err(_) => false,
        });
    }
}

/// Try binding to port, retry with incremented port if in use.
fn try_bind_port(host: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(host, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_bind_retries_next_port() {
        let (_held, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        let (_next, next_port) = try_bind_port(LOCALHOST, port, 3).unwrap();
        assert_ne!(port, next_port);
    }

    #[test]
    fn test_client_receives_broadcast() {
        let server = LiveReload::start(LOCALHOST, 0).unwrap();
        let url = format!("ws://127.0.0.1:{}/", server.port());
        let (mut client, _) = tungstenite::connect(url).unwrap();

        let hello = client.read().unwrap();
        assert!(hello.to_text().unwrap().contains("connected"));

        // Wait for the acceptor to register the client.
        for _ in 0..50 {
            if server.client_count() == 1 {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        server.reload_styles("styles.css");
        let frame = client.read().unwrap();
        assert_eq!(frame.to_text().unwrap(), r#"{"type":"css","path":"styles.css"}"#);
    }
}
