//! Viewer commands.
//!
//! Every input the viewer accepts - HTTP API, stdin shell, keyboard, playback
//! timer - arrives as a [`ViewerCommand`] on one channel, and the thread that
//! owns the viewer runs each to completion before taking the next.

use std::num::IntErrorKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Scrub to an index (clamped)
    Seek(i64),
    StepForward,
    StepBackward,
    Play,
    Pause,
    TogglePlay,
    /// Playback timer fired
    Tick,
    /// Keyboard key by name (`ArrowLeft`, `ArrowRight`, ...)
    Key(String),
    /// Fetch the manifest again
    Reload,
    /// Stop the command loop
    Shutdown,
}

/// Parse a frame index for `Seek`. Integers outside the `i64` range saturate,
/// since seeking clamps anyway. `None` for anything that is not an integer.
pub fn parse_frame_index(text: &str) -> Option<i64> {
    match text.parse::<i64>() {
        Ok(index) => Some(index),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_index() {
        assert_eq!(parse_frame_index("7"), Some(7));
        assert_eq!(parse_frame_index("-2"), Some(-2));
        assert_eq!(parse_frame_index("abc"), None);
        assert_eq!(parse_frame_index(""), None);
        assert_eq!(parse_frame_index("1.5"), None);
    }

    #[test]
    fn test_parse_frame_index_saturates() {
        assert_eq!(parse_frame_index("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_frame_index("-99999999999999999999"), Some(i64::MIN));
    }
}
