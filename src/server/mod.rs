//! HTTP server: the browser is the display surface.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐   crossbeam channel    ┌──────────────────────┐
//! │   API Server Thread     │  ── ViewerCommand ──▶  │   Viewer Thread      │
//! │   (rouille HTTP)        │                        │   (command loop)     │
//! │                         │                        │                      │
//! │  POST /api/next         │  ──▶ StepForward ──▶   │  viewer.apply(..)    │
//! │  POST /api/seek/12      │  ──▶ Seek(12) ─────▶   │                      │
//! └─────────────────────────┘                        └──────────────────────┘
//!          │                                                  │
//!          │  Arc<SharedViewerState>                          │
//!          │◀──────────── read snapshots ─────────────────────│
//!          │                                    SharedSurface writes on render
//! ```
//!
//! # Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/`               | Viewer page                          |
//! | GET    | `/img/...`        | Frame images and `frames.json`       |
//! | GET    | `/api/state`      | Display state + playing + loading    |
//! | GET    | `/api/health`     | Health check                         |
//! | POST   | `/api/seek/{n}`   | Seek to frame n (clamped)            |
//! | POST   | `/api/next`       | Step forward                         |
//! | POST   | `/api/prev`       | Step backward                        |
//! | POST   | `/api/play`       | Start playback                       |
//! | POST   | `/api/pause`      | Pause playback                       |
//! | POST   | `/api/toggle`     | Toggle playback                      |
//! | POST   | `/api/key/{key}`  | Keyboard key (`ArrowLeft`/`ArrowRight`) |
//! | POST   | `/api/reload`     | Fetch the manifest again             |

mod api;

pub use api::{ApiServer, SharedSurface, SharedViewerState, ViewerSnapshot};
