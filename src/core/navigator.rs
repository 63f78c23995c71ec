//! Frame sequence + current position.
//!
//! Position is meaningful only while the sequence is non-empty and is kept in
//! `[0, len-1]` by every mutator. Playback lives in [`crate::core::playback`];
//! the navigator only knows how to move.

use crate::core::frame::Frame;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameNavigator {
    frames: Vec<Frame>,
    position: usize,
}

impl FrameNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(frames: Vec<Frame>) -> Self {
        Self { frames, position: 0 }
    }

    /// Replace the sequence and rewind to the first frame
    pub fn load(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Current index, `None` when the sequence is empty
    pub fn position(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.position)
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.get(self.position)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    pub fn is_at_first(&self) -> bool {
        !self.is_empty() && self.position == 0
    }

    pub fn is_at_last(&self) -> bool {
        self.last_index() == Some(self.position)
    }

    /// Jump to `index`, clamped into `[0, len-1]`. No-op when empty.
    pub fn seek(&mut self, index: i64) {
        let Some(last) = self.last_index() else {
            return;
        };
        self.position = index.clamp(0, last as i64) as usize;
    }

    /// Advance by one frame. Returns false at the last frame (or when empty).
    pub fn step_forward(&mut self) -> bool {
        match self.last_index() {
            Some(last) if self.position < last => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    /// Go back one frame. Returns false at the first frame (or when empty).
    pub fn step_backward(&mut self) -> bool {
        if !self.is_empty() && self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }
}
