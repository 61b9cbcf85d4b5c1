// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local HTTP label endpoint.
//
// A browser userscript on the order-pickup page posts the shelf code of each
// parcel here; we render it to TSPL and push it to the label printer.
//
// # Protocol
//
//   OPTIONS /print   CORS preflight, 200 with no body
//   POST    /print   {"label": "44-10"}
//                    200 {"status":"ok","printed":"44-10","job_id":"…"}
//                    400 {"error":"bad label format"}
//                    400 {"error":"invalid JSON body"}
//                    500 {"error":"<printer error>"}
//
// Every response carries permissive CORS headers (including the Private
// Network Access opt-in) because the caller is a public web page talking to
// 127.0.0.1.
//
// The HTTP handling is minimal: one request per connection,
// `Content-Length` bodies only, `Connection: close` on every response.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use shelftag_core::config::{ServerConfig, ShelftagConfig};
use shelftag_core::error::{Result, ShelftagError};
use shelftag_core::types::ServerStatus;
use shelftag_tspl::{LabelRequest, render_now};

use crate::job::LabelJob;
use crate::sink::PrinterSink;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The only routed path.
const PRINT_PATH: &str = "/print";

/// Maximum bytes accepted for headers plus body.
const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// A client that stalls longer than this mid-request is dropped.
const READ_TIMEOUT_SECS: u64 = 10;

/// Headers attached to every response.
const CORS_HEADERS: &[(&str, &str)] = &[
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Private-Network", "true"),
];

// ---------------------------------------------------------------------------
// Minimal HTTP request parser
// ---------------------------------------------------------------------------

/// Request line and the headers we care about.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HttpRequest {
    method: String,
    /// Path without the query string.
    path: String,
    content_length: usize,
}

/// What came in on a connection.
#[derive(Debug)]
enum Incoming {
    /// Peer closed before sending anything.
    Closed,
    TooLarge,
    Malformed(String),
    Request(HttpRequest, Vec<u8>),
}

/// Parse the request line and headers (everything before the blank line).
fn parse_http_head(head: &[u8]) -> std::result::Result<HttpRequest, String> {
    let head = std::str::from_utf8(head).map_err(|_| "headers are not UTF-8".to_string())?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_ascii_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("bad request line: {request_line:?}"));
    };
    if !version.starts_with("HTTP/") {
        return Err(format!("bad HTTP version: {version:?}"));
    }

    let mut content_length = 0;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("bad Content-Length: {:?}", value.trim()))?;
        }
    }

    let path = target.split('?').next().unwrap_or_default().to_string();

    Ok(HttpRequest {
        method: method.to_ascii_uppercase(),
        path,
        content_length,
    })
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Read one request (headers plus `Content-Length` body) from `stream`.
async fn read_request(stream: &mut TcpStream) -> Result<Incoming> {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() >= MAX_REQUEST_BYTES {
            return Ok(Incoming::TooLarge);
        }
        let n = read_chunk(stream, &mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(Incoming::Closed);
            }
            return Ok(Incoming::Malformed("connection closed inside headers".into()));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let request = match parse_http_head(&buf[..header_end]) {
        Ok(request) => request,
        Err(reason) => return Ok(Incoming::Malformed(reason)),
    };

    let body_offset = header_end + 4;
    if request.content_length > MAX_REQUEST_BYTES.saturating_sub(body_offset) {
        return Ok(Incoming::TooLarge);
    }
    let body_end = body_offset + request.content_length;

    while buf.len() < body_end {
        let n = read_chunk(stream, &mut chunk).await?;
        if n == 0 {
            return Ok(Incoming::Malformed(format!(
                "body truncated at {} of {} bytes",
                buf.len() - body_offset,
                request.content_length
            )));
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = buf[body_offset..body_end].to_vec();
    Ok(Incoming::Request(request, body))
}

async fn read_chunk(stream: &mut TcpStream, chunk: &mut [u8]) -> Result<usize> {
    tokio::time::timeout(Duration::from_secs(READ_TIMEOUT_SECS), stream.read(chunk))
        .await
        .map_err(|_| ShelftagError::Server(format!("read timed out after {READ_TIMEOUT_SECS}s")))?
        .map_err(|e| ShelftagError::Server(format!("read: {e}")))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct HttpResponse {
    status: u16,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            body: value.to_string().into_bytes(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "error": message }))
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        if !self.body.is_empty() {
            head.push_str("Content-Type: application/json\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        for (name, value) in CORS_HEADERS {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

async fn send_response(stream: &mut TcpStream, response: &HttpResponse) -> Result<()> {
    stream
        .write_all(&response.to_bytes())
        .await
        .map_err(|e| ShelftagError::Server(format!("write response: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| ShelftagError::Server(format!("flush: {e}")))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared state passed to connection handlers
// ---------------------------------------------------------------------------

/// State shared across all connection-handling tasks.
struct SharedState {
    /// Read-only for the life of the server.
    config: Arc<ShelftagConfig>,
    /// Held for the duration of each job so jobs never interleave.
    sink: Mutex<PrinterSink>,
    active_connections: Arc<AtomicU32>,
}

/// Counts a live connection until dropped, even if the handler unwinds.
struct ConnectionGuard<'a>(&'a AtomicU32);

impl<'a> ConnectionGuard<'a> {
    fn enter(counter: &'a AtomicU32) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for ConnectionGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// LabelServer
// ---------------------------------------------------------------------------

/// The HTTP endpoint that turns posted shelf codes into printed labels.
pub struct LabelServer {
    /// `host:port` to bind; port 0 picks a free port.
    bind_addr: String,
    /// Address actually bound, once running.
    local_addr: Option<SocketAddr>,
    status: ServerStatus,
    /// Notification handle used to signal a graceful shutdown.
    shutdown_signal: Arc<Notify>,
    /// Handle to the Tokio task running the accept loop.
    task_handle: Option<JoinHandle<()>>,
    active_connections: Arc<AtomicU32>,
}

impl LabelServer {
    /// Create a server for `host:port` in `Stopped` state.
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            bind_addr: format!("{host}:{port}"),
            local_addr: None,
            status: ServerStatus::Stopped,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            active_connections: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn from_config(server: &ServerConfig) -> Self {
        Self::new(&server.host, server.port)
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Address the listener is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn status(&self) -> ServerStatus {
        self.status
    }

    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Returns the bound address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or already in use.
    pub async fn start(
        &mut self,
        config: Arc<ShelftagConfig>,
        sink: PrinterSink,
    ) -> Result<SocketAddr> {
        if let (ServerStatus::Running, Some(addr)) = (self.status, self.local_addr) {
            debug!(addr = %addr, "label server already running");
            return Ok(addr);
        }

        self.status = ServerStatus::Starting;

        let listener = match TcpListener::bind(&self.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                self.status = ServerStatus::Error;
                return Err(ShelftagError::Server(format!("bind {}: {e}", self.bind_addr)));
            }
        };
        let local_addr = listener
            .local_addr()
            .map_err(|e| ShelftagError::Server(format!("local address: {e}")))?;

        info!(
            addr = %local_addr,
            printer = %config.printer.name,
            sink = %sink,
            "label server listening"
        );

        let shared = Arc::new(SharedState {
            config,
            sink: Mutex::new(sink),
            active_connections: Arc::clone(&self.active_connections),
        });
        let shutdown = Arc::clone(&self.shutdown_signal);

        let handle = tokio::spawn(async move {
            Self::accept_loop(listener, shutdown, shared).await;
        });

        self.task_handle = Some(handle);
        self.local_addr = Some(local_addr);
        self.status = ServerStatus::Running;
        Ok(local_addr)
    }

    /// Gracefully stop the server.
    ///
    /// Connections already accepted run to completion in their own tasks.
    pub async fn stop(&mut self) -> Result<()> {
        if self.status != ServerStatus::Running {
            return Ok(());
        }

        info!(addr = ?self.local_addr, "stopping label server");
        self.shutdown_signal.notify_one();

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| ShelftagError::Server(format!("task join: {e}")))?;
        }

        self.status = ServerStatus::Stopped;
        self.local_addr = None;
        info!("label server stopped");
        Ok(())
    }

    /// The main accept loop; runs until the shutdown signal is received.
    async fn accept_loop(listener: TcpListener, shutdown: Arc<Notify>, shared: Arc<SharedState>) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("accept loop received shutdown signal");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            debug!(peer = %peer_addr, "incoming connection");
                            let state = Arc::clone(&shared);
                            tokio::spawn(async move {
                                let _counted = ConnectionGuard::enter(&state.active_connections);
                                if let Err(e) = Self::handle_connection(stream, peer_addr, &state).await {
                                    warn!(peer = %peer_addr, error = %e, "connection handler error");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    /// Read one request, dispatch it, write the response, close.
    async fn handle_connection(
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        state: &SharedState,
    ) -> Result<()> {
        let response = match read_request(&mut stream).await? {
            Incoming::Closed => {
                debug!(peer = %peer_addr, "empty connection -- closing");
                return Ok(());
            }
            Incoming::TooLarge => {
                warn!(peer = %peer_addr, limit = MAX_REQUEST_BYTES, "request too large");
                HttpResponse::error(413, "request too large")
            }
            Incoming::Malformed(reason) => {
                warn!(peer = %peer_addr, reason = %reason, "malformed HTTP request");
                HttpResponse::error(400, "malformed HTTP request")
            }
            Incoming::Request(request, body) => {
                debug!(
                    peer = %peer_addr,
                    method = %request.method,
                    path = %request.path,
                    body_bytes = body.len(),
                    "parsed HTTP request"
                );
                dispatch(&request, &body, state).await
            }
        };

        send_response(&mut stream, &response).await?;
        debug!(peer = %peer_addr, status = response.status, "HTTP response sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Body of `POST /print`.
#[derive(Debug, Deserialize)]
struct PrintRequest {
    #[serde(default)]
    label: Option<String>,
}

async fn dispatch(request: &HttpRequest, body: &[u8], state: &SharedState) -> HttpResponse {
    if request.path != PRINT_PATH {
        return HttpResponse::error(404, "not found");
    }
    match request.method.as_str() {
        "OPTIONS" => HttpResponse::empty(200),
        "POST" => handle_print(body, state).await,
        _ => HttpResponse::error(405, "method not allowed"),
    }
}

/// Handle `POST /print`: validate, render, print.
#[instrument(skip_all)]
async fn handle_print(body: &[u8], state: &SharedState) -> HttpResponse {
    let payload: PrintRequest = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "invalid JSON body");
            return HttpResponse::error(400, "invalid JSON body");
        }
    };

    let label = LabelRequest::new(payload.label.as_deref().unwrap_or_default());
    info!(label = %label, "REQUEST /print");

    let label = match require_shelf_code(label) {
        Ok(label) => label,
        Err(e) => {
            warn!(error = %e, "rejecting label");
            return HttpResponse::error(400, "bad label format");
        }
    };

    let rendered = render_now(&label, &state.config);
    let job = LabelJob::new(&label, &rendered.script);

    let sink = state.sink.lock().await;
    match sink.send(&job).await {
        Ok(()) => {
            info!(label = %label, job_id = %job.id, "PRINT OK");
            HttpResponse::json(
                200,
                &json!({
                    "status": "ok",
                    "printed": label.as_str(),
                    "job_id": job.id.to_string(),
                }),
            )
        }
        Err(e) => {
            error!(label = %label, job_id = %job.id, error = %e, "PRINT ERROR");
            HttpResponse::error(500, &e.to_string())
        }
    }
}

/// Only `<digits>-<digits>` codes are printed from the HTTP endpoint.
fn require_shelf_code(label: LabelRequest) -> Result<LabelRequest> {
    if label.is_empty() {
        return Err(ShelftagError::InvalidLabel("empty label".into()));
    }
    if label.is_shelf_code() {
        Ok(label)
    } else {
        Err(ShelftagError::InvalidLabel(label.to_string()))
    }
}
