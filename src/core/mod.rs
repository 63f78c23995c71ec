//! Core engine modules - frames, manifest, navigation, playback
//!
//! These modules form the viewer engine, independent of any display surface.

pub mod events;
pub mod frame;
pub mod manifest;
pub mod navigator;
pub mod playback;
pub mod viewer;

// Re-exports for convenience
pub use events::ViewerCommand;
pub use frame::Frame;
pub use manifest::{ManifestError, ManifestLocation};
pub use navigator::FrameNavigator;
pub use playback::{Playback, PlaybackTimer};
pub use viewer::Viewer;
