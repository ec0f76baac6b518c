//! Threaded tiny_http listener.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tiny_http::{Header, Request, Response, Server, StatusCode};
use voxmap_tiles::TileService;
use voxmap_world::WorldProvider;

use crate::routes::{Route, build_state, parse_route};

#[derive(Debug, thiserror::Error)]
pub enum TileServerError {
    #[error("Failed to bind to {addr}: {error}")]
    BindError { addr: SocketAddr, error: String },
    #[error("Failed to spawn request worker: {0}")]
    Spawn(#[from] io::Error),
}

/// HTTP server for map tiles.
///
/// Requests are handled by a pool of worker threads that all pull from one
/// listening socket, so a slow render only blocks its own worker.
pub struct TileServer {
    addr: SocketAddr,
    workers: usize,
    actual_port: Option<u16>,
    server: Option<Arc<Server>>,
    handles: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

struct Context {
    service: Arc<TileService>,
    provider: Arc<dyn WorldProvider>,
}

impl TileServer {
    /// `workers == 0` means one worker per CPU.
    pub fn new(addr: SocketAddr, workers: usize) -> Self {
        let workers = if workers == 0 { num_cpus::get() } else { workers };
        Self {
            addr,
            workers: workers.max(1),
            actual_port: None,
            server: None,
            handles: Vec::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(
        &mut self,
        service: Arc<TileService>,
        provider: Arc<dyn WorldProvider>,
    ) -> Result<(), TileServerError> {
        let server = Server::http(self.addr).map_err(|e| TileServerError::BindError {
            addr: self.addr,
            error: e.to_string(),
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.addr.port());
        self.actual_port = Some(actual_port);

        let server = Arc::new(server);
        let context = Arc::new(Context { service, provider });
        self.server = Some(Arc::clone(&server));

        for id in 0..self.workers {
            let server = Arc::clone(&server);
            let context = Arc::clone(&context);
            let shutdown = Arc::clone(&self.shutdown);
            let handle = thread::Builder::new()
                .name(format!("voxmap-http-{id}"))
                .spawn(move || Self::run_worker(&server, &context, &shutdown))?;
            self.handles.push(handle);
        }

        tracing::info!(port = actual_port, workers = self.workers, "tile server listening");
        Ok(())
    }

    /// Unblocks every worker and waits for them to exit.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(server) = self.server.take() {
            // Each call releases one thread blocked in recv().
            for _ in 0..self.handles.len() {
                server.unblock();
            }
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::error!("tile server worker panicked");
            }
        }
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.addr.port())
    }

    /// Blocks until every worker has exited.
    pub fn join(mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::error!("tile server worker panicked");
            }
        }
    }

    fn run_worker(server: &Server, context: &Context, shutdown: &AtomicBool) {
        loop {
            match server.recv() {
                Ok(request) => {
                    if let Err(e) = Self::handle_request(request, context) {
                        tracing::warn!(error = %e, "failed to send response");
                    }
                }
                Err(e) => {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    tracing::warn!(error = %e, "failed to accept request");
                }
            }
        }
    }

    fn handle_request(request: Request, context: &Context) -> io::Result<()> {
        let route = parse_route(request.method(), request.url());
        tracing::debug!(method = %request.method(), url = request.url(), ?route, "request");

        match route {
            Route::Health => request.respond(json_response(&serde_json::json!({ "status": "ok" }))),
            Route::State => {
                let state = build_state(context.provider.as_ref(), &context.service);
                request.respond(json_response(&state))
            }
            Route::Tile {
                world,
                view,
                tile_x,
                tile_z,
            } => match context.service.get_or_render_tile(&world, view, tile_x, tile_z) {
                Some(tile) => {
                    let response = Response::from_data(tile.bytes);
                    let response = with_header(response, "Content-Type", "image/png");
                    request.respond(with_header(response, "Cache-Control", "no-cache"))
                }
                None => request.respond(
                    text_response(
                        "Tile not available (world may be unloaded and not yet rendered)",
                    )
                    .with_status_code(StatusCode(404)),
                ),
            },
            Route::BadRequest(reason) => {
                request.respond(text_response(reason).with_status_code(StatusCode(400)))
            }
            Route::NotFound => {
                request.respond(text_response("Not found").with_status_code(StatusCode(404)))
            }
        }
    }
}

impl Drop for TileServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn with_header<R: io::Read>(response: Response<R>, name: &str, value: &str) -> Response<R> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

fn text_response(body: &str) -> Response<io::Cursor<Vec<u8>>> {
    with_header(
        Response::from_string(body),
        "Content-Type",
        "text/plain; charset=utf-8",
    )
}

fn json_response<T: serde::Serialize>(value: &T) -> Response<io::Cursor<Vec<u8>>> {
    match serde_json::to_string(value) {
        Ok(json) => {
            let response = Response::from_string(json);
            let response = with_header(response, "Content-Type", "application/json; charset=utf-8");
            with_header(response, "Cache-Control", "no-cache")
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            text_response("Internal error").with_status_code(StatusCode(500))
        }
    }
}
