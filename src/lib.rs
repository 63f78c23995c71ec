//! frameview - frame sequence viewer library
//!
//! Re-exports all modules for use by the binary target.

// Core engine (frames, manifest, navigator, playback)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod display;
pub mod fetch;
pub mod input;
pub mod runner;
pub mod server;
pub mod shell;

// Re-export commonly used types from core
pub use crate::core::frame::Frame;
pub use crate::core::navigator::FrameNavigator;
pub use crate::core::viewer::Viewer;
pub use display::{DisplayState, DisplaySurface, reconcile};
