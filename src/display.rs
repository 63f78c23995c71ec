//! Display reconciliation.
//!
//! [`reconcile`] maps the navigator to everything a display surface shows:
//! image, label, step controls and scrub range. It is recomputed in full after
//! every mutation; there is no partial update path. Surfaces implement
//! [`DisplaySurface`] and only ever receive complete [`DisplayState`]s.

use log::{debug, info};
use serde::Serialize;

use crate::core::navigator::FrameNavigator;

/// Label shown when there is nothing to display
pub const EMPTY_LABEL: &str = "No frames found";

/// Numeric scrub control bound to `[min, max]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScrubState {
    pub enabled: bool,
    pub min: usize,
    pub max: usize,
    pub value: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayState {
    /// Current frame URL, `None` = image hidden
    pub image: Option<String>,
    pub label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub scrub: ScrubState,
}

impl DisplayState {
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        reconcile(&FrameNavigator::new())
    }
}

/// Pure function of (sequence, position)
pub fn reconcile(nav: &FrameNavigator) -> DisplayState {
    let (Some(frame), Some(position), Some(last)) =
        (nav.current(), nav.position(), nav.last_index())
    else {
        return DisplayState {
            image: None,
            label: EMPTY_LABEL.to_string(),
            prev_enabled: false,
            next_enabled: false,
            scrub: ScrubState::default(),
        };
    };

    DisplayState {
        image: Some(frame.url().to_string()),
        label: format!("Frame {} / {}", position + 1, nav.len()),
        prev_enabled: position > 0,
        next_enabled: position < last,
        scrub: ScrubState {
            enabled: true,
            min: 0,
            max: last,
            value: position,
        },
    }
}

/// Something that shows the viewer: a browser page, a log, a test recorder.
pub trait DisplaySurface {
    /// Write a complete display state
    fn render(&mut self, state: &DisplayState);

    /// Playback started/stopped
    fn set_playing(&mut self, _playing: bool) {}

    /// Manifest fetch in progress
    fn set_loading(&mut self, _loading: bool) {}
}

/// Headless surface: logs every state it is given
#[derive(Debug, Default)]
pub struct LogSurface;

impl LogSurface {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySurface for LogSurface {
    fn render(&mut self, state: &DisplayState) {
        match &state.image {
            Some(image) => info!("{} [{}]", state.label, image),
            None => info!("{}", state.label),
        }
    }

    fn set_playing(&mut self, playing: bool) {
        info!("{}", if playing { "Playing" } else { "Paused" });
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            info!("Loading frames...");
        } else {
            debug!("Loading finished");
        }
    }
}
