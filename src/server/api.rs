//! REST API implementation using rouille.
//!
//! # Key types
//!
//! - [`ApiServer`] - HTTP server runner, spawns background thread
//! - [`SharedViewerState`] - thread-safe snapshot written by the viewer thread
//! - [`SharedSurface`] - display surface that writes into the snapshot
//! - [`ViewerSnapshot`] - JSON-serializable state copy served by `/api/state`
//!
//! # Thread safety
//!
//! - `SharedViewerState` uses `RwLock` - viewer thread writes, HTTP handlers read
//! - Commands go out via `crossbeam_channel::Sender` - never blocks
//! - CORS headers added to all responses for browser access

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, mpsc};
use std::thread;

use anyhow::anyhow;
use crossbeam_channel::Sender;
use log::{debug, info, trace};
use rouille::{Request, Response};
use serde::Serialize;

use crate::core::events::{ViewerCommand, parse_frame_index};
use crate::display::{DisplayState, DisplaySurface};

const INDEX_HTML: &str = include_str!("index.html");

/// Viewer state snapshot for API responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewerSnapshot {
    #[serde(flatten)]
    pub display: DisplayState,
    pub playing: bool,
    pub loading: bool,
}

/// Shared state readable by API handlers (updated by the viewer thread)
#[derive(Debug, Default)]
pub struct SharedViewerState {
    snapshot: RwLock<ViewerSnapshot>,
}

impl SharedViewerState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn update(&self, f: impl FnOnce(&mut ViewerSnapshot)) {
        f(&mut self.snapshot.write().unwrap_or_else(|e| e.into_inner()));
    }
}

/// Display surface backing the browser page
#[derive(Debug, Clone)]
pub struct SharedSurface {
    state: Arc<SharedViewerState>,
}

impl SharedSurface {
    pub fn new(state: Arc<SharedViewerState>) -> Self {
        Self { state }
    }
}

impl DisplaySurface for SharedSurface {
    fn render(&mut self, state: &DisplayState) {
        debug!("Display: {}", state.label);
        self.state.update(|s| s.display = state.clone());
    }

    fn set_playing(&mut self, playing: bool) {
        self.state.update(|s| s.playing = playing);
    }

    fn set_loading(&mut self, loading: bool) {
        self.state.update(|s| s.loading = loading);
    }
}

/// Generic API response
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self { success: true, message: None, error: None }
    }

    fn ok_msg(msg: &str) -> Self {
        Self { success: true, message: Some(msg.to_string()), error: None }
    }

    fn err(msg: &str) -> Self {
        Self { success: false, message: None, error: Some(msg.to_string()) }
    }
}

/// Everything a request handler needs
struct Routes {
    state: Arc<SharedViewerState>,
    commands: Sender<ViewerCommand>,
    img_dir: Option<PathBuf>,
}

/// Running HTTP server; stop with [`ApiServer::stop`] or let the process exit
pub struct ApiServer {
    addr: SocketAddr,
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl ApiServer {
    /// Bind `0.0.0.0:port` and serve on a background thread.
    ///
    /// `img_dir` is served under `/img/` when the frames are local.
    pub fn start(
        port: u16,
        img_dir: Option<PathBuf>,
        state: Arc<SharedViewerState>,
        commands: Sender<ViewerCommand>,
    ) -> anyhow::Result<Self> {
        let routes = Routes { state, commands, img_dir };
        let addr = format!("0.0.0.0:{}", port);

        let server = rouille::Server::new(&addr, move |request| handle_request(request, &routes))
            .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;
        let addr = server.server_addr();
        info!("Viewer available at http://{}", addr);

        let (handle, stop_tx) = server.stoppable();
        Ok(Self { addr, stop_tx, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
        info!("API server stopped");
    }
}

fn handle_request(request: &Request, routes: &Routes) -> Response {
    trace!("{} {}", request.method(), request.url());
    route(request, routes).with_additional_header("Access-Control-Allow-Origin", "*")
}

fn route(request: &Request, routes: &Routes) -> Response {
    // Handle preflight
    if request.method() == "OPTIONS" {
        return Response::empty_204()
            .with_additional_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
    }

    // Frame images and the manifest
    if request.url().starts_with("/img/") {
        let img_request = request.remove_prefix("/img");
        if let (Some(img_request), Some(dir)) = (img_request, &routes.img_dir) {
            let response = rouille::match_assets(&img_request, dir);
            if response.is_success() {
                return response;
            }
        }
        return Response::json(&ApiResponse::err("Not found")).with_status_code(404);
    }

    // Handle paths with parameters manually (router! doesn't capture well)
    let path = request.url();
    if request.method() == "POST" {
        // /api/seek/{n}
        if let Some(index_str) = path.strip_prefix("/api/seek/") {
            return match parse_frame_index(index_str) {
                Some(index) => send_command(&routes.commands, ViewerCommand::Seek(index)),
                None => Response::json(&ApiResponse::err("Invalid frame index"))
                    .with_status_code(400),
            };
        }
        // /api/key/{key}
        if let Some(key) = path.strip_prefix("/api/key/") {
            if key.is_empty() {
                return Response::json(&ApiResponse::err("Missing key")).with_status_code(400);
            }
            return send_command(&routes.commands, ViewerCommand::Key(key.to_string()));
        }
    }

    rouille::router!(request,
        (GET) ["/"] => {
            Response::html(INDEX_HTML)
        },

        // Status endpoints
        (GET) ["/api/state"] => {
            Response::json(&routes.state.snapshot())
        },
        (GET) ["/api/health"] => {
            Response::json(&ApiResponse::ok_msg("frameview API server"))
        },

        // Navigation
        (POST) ["/api/next"] => {
            send_command(&routes.commands, ViewerCommand::StepForward)
        },
        (POST) ["/api/prev"] => {
            send_command(&routes.commands, ViewerCommand::StepBackward)
        },
        (POST) ["/api/seek"] => {
            // Fallback - requires /api/seek/{n}
            Response::json(&ApiResponse::err("Missing frame index")).with_status_code(400)
        },

        // Playback
        (POST) ["/api/play"] => {
            send_command(&routes.commands, ViewerCommand::Play)
        },
        (POST) ["/api/pause"] => {
            send_command(&routes.commands, ViewerCommand::Pause)
        },
        (POST) ["/api/toggle"] => {
            send_command(&routes.commands, ViewerCommand::TogglePlay)
        },

        (POST) ["/api/reload"] => {
            send_command(&routes.commands, ViewerCommand::Reload)
        },

        // Fallback
        _ => {
            Response::json(&ApiResponse::err("Not found")).with_status_code(404)
        }
    )
}

fn send_command(tx: &Sender<ViewerCommand>, cmd: ViewerCommand) -> Response {
    match tx.send(cmd) {
        Ok(_) => Response::json(&ApiResponse::ok()),
        Err(e) => Response::json(&ApiResponse::err(&format!("Failed to send command: {}", e)))
            .with_status_code(500),
    }
}
