use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;
use log::{error, info, warn};
use tiny_http::{Header, Request, Response, Server};

use crate::config::ServerConfig;
use crate::coord::Viewport;
use crate::query::{parse_query, query_of};
use crate::render::{encode_png, Renderer};

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to listen on {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },
    #[error("listener on {0} stopped accepting connections")]
    Stopped(SocketAddr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn png(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "image/png",
            body,
        }
    }

    fn text(status: u16, message: String) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: message.into_bytes(),
        }
    }
}

/// Builds the reply for a request target such as `/?center=0%2B0i&width=2`.
/// The path is ignored.
pub fn respond(target: &str, config: &ServerConfig) -> Reply {
    let viewport = match parse_query(query_of(target)) {
        Ok(viewport) => viewport,
        Err(err) => {
            warn!("Bad request: {}", err);
            return Reply::text(400, err.to_string());
        }
    };
    let renderer = match Renderer::new(&config.render) {
        Ok(renderer) => renderer,
        Err(err) => {
            error!("Invalid render configuration: {}", err);
            return Reply::text(500, err.to_string());
        }
    };

    let img = match render_with_timeout(renderer, viewport, config.timeout) {
        Ok(img) => img,
        Err(RecvTimeoutError::Timeout) => {
            error!("Render of {:?} timed out after {:?}", viewport, config.timeout);
            let message = format!("render timed out after {}s", config.timeout.as_secs_f64());
            return Reply::text(503, message);
        }
        Err(RecvTimeoutError::Disconnected) => {
            error!("Render of {:?} failed", viewport);
            return Reply::text(500, "render failed".to_string());
        }
    };

    match encode_png(&img) {
        Ok(bytes) => Reply::png(bytes),
        Err(err) => {
            error!("Encoding PNG failed: {}", err);
            Reply::text(500, err.to_string())
        }
    }
}

fn render_with_timeout(
    renderer: Renderer,
    viewport: Viewport,
    timeout: Duration,
) -> Result<RgbaImage, RecvTimeoutError> {
    let (tx, rx) = channel::<RgbaImage>();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);
    thread::spawn(move || {
        let start = Instant::now();
        match renderer.render_cancellable(&viewport, &worker_cancel) {
            Some(img) => {
                info!("Calculated in {:?}", start.elapsed());
                // fails only when the request already gave up waiting
                if tx.send(img).is_err() {
                    warn!("Discarding render that finished after its request timed out");
                }
            }
            None => info!("Render cancelled after {:?}", start.elapsed()),
        }
    });
    let result = rx.recv_timeout(timeout);
    if result.is_err() {
        cancel.store(true, Ordering::Relaxed);
    }
    result
}

fn handle(request: Request, config: &ServerConfig) {
    info!("Received request {} {}", request.method(), request.url());
    let reply = respond(request.url(), config);

    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    match Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        Ok(header) => response.add_header(header),
        Err(()) => error!("Invalid content type {:?}", reply.content_type),
    }
    if let Err(err) = request.respond(response) {
        error!("Failed to send response: {}", err);
    }
}

pub fn listen(config: &ServerConfig) -> Result<Server, ServeError> {
    let addr = config.addr();
    let server = Server::http(addr).map_err(|err| ServeError::Bind {
        addr,
        reason: err.to_string(),
    })?;
    info!("Listening on {}", server.server_addr().to_ip().unwrap_or(addr));
    Ok(server)
}

/// Serves until the listener fails. Each request is handled on its own thread.
pub fn serve(config: ServerConfig) -> Result<(), ServeError> {
    let server = listen(&config)?;
    accept(server, config)
}

fn accept(server: Server, config: ServerConfig) -> Result<(), ServeError> {
    let addr = server.server_addr().to_ip().unwrap_or(config.addr());
    let config = Arc::new(config);
    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        thread::spawn(move || handle(request, &config));
    }
    Err(ServeError::Stopped(addr))
}
