//! HTTP server for the credential API.
//!
//! A fixed pool of worker threads shares one `tiny_http` listener. Each
//! worker takes one request at a time, reads its body, runs it through
//! [`route`] against the shared store and writes the reply. Requests are
//! therefore handled in parallel, one per worker.

use super::config::ServerConfig;
use super::handlers::{route, Reply};
use super::ServerError;
use crate::store::CredentialStore;
use log::{debug, error, info, warn};
use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Request, Response, Server};

/// Largest request body read from a client, in bytes.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

/// How often idle workers check the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Running HTTP server.
///
/// Drop it (or call [`HttpServer::stop`]) to shut down the workers.
pub struct HttpServer {
    /// Worker thread handles.
    workers: Vec<thread::JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Address the listener is bound to.
    local_addr: SocketAddr,
}

impl HttpServer {
    /// Bind the listener and start the worker threads.
    pub fn start(config: &ServerConfig, store: Arc<CredentialStore>) -> Result<Self, ServerError> {
        let addr = config.address();
        let server =
            Server::http(&addr).map_err(|e| ServerError::Bind(format!("{}: {}", addr, e)))?;
        let local_addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| ServerError::Bind(format!("{}: not an IP listener", addr)))?;

        info!(
            "Listening on http://{} with {} workers",
            local_addr, config.workers
        );

        let server = Arc::new(server);
        let mut this = Self {
            workers: Vec::with_capacity(config.workers),
            shutdown: Arc::new(AtomicBool::new(false)),
            local_addr,
        };

        // If a spawn fails, dropping `this` stops the workers already running.
        for id in 0..config.workers {
            let server = Arc::clone(&server);
            let store = Arc::clone(&store);
            let shutdown = Arc::clone(&this.shutdown);
            let handle = thread::Builder::new()
                .name(format!("http-worker-{}", id))
                .spawn(move || Self::run_worker(&server, &store, &shutdown))?;
            this.workers.push(handle);
        }

        Ok(this)
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Worker loop: take requests until shutdown is signalled.
    fn run_worker(server: &Server, store: &CredentialStore, shutdown: &AtomicBool) {
        loop {
            // Acquire pairs with the Release store in stop()
            if shutdown.load(Ordering::Acquire) {
                debug!("Worker shutting down");
                break;
            }

            match server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => Self::handle(request, store),
                Ok(None) => {}
                Err(e) => {
                    error!("Server error: {}", e);
                    break;
                }
            }
        }
    }

    fn handle(mut request: Request, store: &CredentialStore) {
        let body = match read_body(request.as_reader()) {
            Ok(Some(body)) => body,
            Ok(None) => {
                warn!(
                    "Rejecting {} {}: body exceeds {} bytes",
                    request.method(),
                    path_of(request.url()),
                    MAX_BODY_BYTES
                );
                // Drain the rest so the client reads the reply instead of a reset
                let _ = std::io::copy(request.as_reader(), &mut std::io::sink());
                let response = Response::from_string("Payload Too Large").with_status_code(413);
                let _ = request.respond(response);
                return;
            }
            Err(e) => {
                warn!("Failed to read request body: {}", e);
                let response = Response::from_string("Bad Request").with_status_code(400);
                let _ = request.respond(response);
                return;
            }
        };

        debug!("{} {}", request.method(), path_of(request.url()));
        let reply = route(store, request.method(), request.url(), &body);

        if let Err(e) = request.respond(into_response(reply)) {
            warn!("Failed to send response: {}", e);
        }
    }

    /// Stop the server and wait for the workers.
    ///
    /// Note: May take up to 100ms due to polling interval.
    pub fn stop(&mut self) {
        // Release so the workers see the flag
        self.shutdown.store(true, Ordering::Release);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read a request body, or `None` if it is longer than [`MAX_BODY_BYTES`].
fn read_body<R: Read + ?Sized>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    reader.take(MAX_BODY_BYTES + 1).read_to_end(&mut body)?;
    if body.len() as u64 > MAX_BODY_BYTES {
        return Ok(None);
    }
    Ok(Some(body))
}

fn into_response(reply: Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response = Response::from_data(reply.body)
        .with_status_code(reply.status)
        .with_header(header("Content-Type", reply.content_type));
    if let Some(allow) = reply.allow {
        response.add_header(header("Allow", allow));
    }
    response
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header")
}

// Query strings can carry passwords; only the path is logged.
fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
