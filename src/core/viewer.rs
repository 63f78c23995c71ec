//! The frame navigator state machine.
//!
//! **Architecture**: `Viewer` is the single owned state object. It holds the
//! [`FrameNavigator`], the [`Playback`] state and the display surface, and
//! reconciles the surface after every mutation (load, seek, successful step).
//!
//! # Playback
//!
//! ```text
//!            play (non-empty)
//!   Idle ──────────────────────▶ Running(timer)
//!    ▲                               │
//!    └─── pause / end of sequence ◀──┘
//! ```
//!
//! Each timer tick steps forward once. Playback ends when a tick cannot move,
//! or when it lands on the last frame.

use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, error, info, trace};

use crate::core::events::ViewerCommand;
use crate::core::frame::Frame;
use crate::core::manifest::{self, ManifestLocation};
use crate::core::navigator::FrameNavigator;
use crate::core::playback::{Playback, PlaybackTimer};
use crate::display::{self, DisplaySurface};
use crate::input;

pub struct Viewer<S: DisplaySurface> {
    navigator: FrameNavigator,
    playback: Playback,
    surface: S,
    /// Where the playback timer sends ticks (the viewer's own command channel)
    ticks: Sender<ViewerCommand>,
    play_interval: Duration,
}

impl<S: DisplaySurface> Viewer<S> {
    /// Create an idle, empty viewer and render its empty state
    pub fn new(surface: S, ticks: Sender<ViewerCommand>, play_interval: Duration) -> Self {
        let mut viewer = Self {
            navigator: FrameNavigator::new(),
            playback: Playback::Idle,
            surface,
            ticks,
            play_interval,
        };
        viewer.reconcile();
        viewer
    }

    pub fn navigator(&self) -> &FrameNavigator {
        &self.navigator
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_running()
    }

    /// Replace the sequence and rewind. Stops playback first.
    pub fn load(&mut self, frames: Vec<Frame>) {
        self.pause();
        self.navigator.load(frames);
        info!("Loaded {} frames.", self.navigator.len());
        self.reconcile();
    }

    /// Fetch the manifest and load it. Failures load an empty sequence.
    pub fn load_from(&mut self, location: &ManifestLocation, max_frames: usize) {
        self.surface.set_loading(true);
        let frames = manifest::load_frames(location, max_frames);
        self.surface.set_loading(false);
        self.load(frames);
    }

    pub fn seek(&mut self, index: i64) {
        self.navigator.seek(index);
        trace!("Seek {} -> {:?}", index, self.navigator.position());
        self.reconcile();
    }

    /// Returns whether the position moved
    pub fn step_forward(&mut self) -> bool {
        let moved = self.navigator.step_forward();
        if moved {
            self.reconcile();
        }
        moved
    }

    /// Returns whether the position moved
    pub fn step_backward(&mut self) -> bool {
        let moved = self.navigator.step_backward();
        if moved {
            self.reconcile();
        }
        moved
    }

    /// Start the playback timer. No-op if running or empty.
    pub fn play(&mut self) {
        if self.playback.is_running() || self.navigator.is_empty() {
            return;
        }
        match PlaybackTimer::start(self.play_interval, self.ticks.clone()) {
            Ok(timer) => {
                debug!(
                    "Playback started at {:?}, one frame every {:?}",
                    self.navigator.position(),
                    timer.period()
                );
                self.playback = Playback::Running(timer);
                self.surface.set_playing(true);
            }
            Err(e) => error!("Failed to start playback timer: {}", e),
        }
    }

    /// Cancel the playback timer. No-op if idle.
    pub fn pause(&mut self) {
        if self.playback.stop() {
            debug!("Playback stopped at {:?}", self.navigator.position());
            self.surface.set_playing(false);
        }
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// One playback driver step
    pub fn tick(&mut self) {
        if !self.playback.is_running() {
            // Queued before the timer was cancelled
            trace!("Ignoring stale tick");
            return;
        }
        if !self.step_forward() || self.navigator.is_at_last() {
            debug!("End of sequence reached");
            self.pause();
        }
    }

    pub fn handle_key(&mut self, key: &str) {
        match input::command_for_key(key) {
            Some(command) => self.apply(command),
            None => trace!("Unbound key {:?}", key),
        }
    }

    /// Apply a navigation/playback command. `Reload` and `Shutdown` belong to
    /// the command loop and are ignored here.
    pub fn apply(&mut self, command: ViewerCommand) {
        match command {
            ViewerCommand::Seek(index) => self.seek(index),
            ViewerCommand::StepForward => {
                self.step_forward();
            }
            ViewerCommand::StepBackward => {
                self.step_backward();
            }
            ViewerCommand::Play => self.play(),
            ViewerCommand::Pause => self.pause(),
            ViewerCommand::TogglePlay => self.toggle_play(),
            ViewerCommand::Tick => self.tick(),
            ViewerCommand::Key(key) => self.handle_key(&key),
            ViewerCommand::Reload | ViewerCommand::Shutdown => {
                trace!("{:?} is handled by the command loop", command);
            }
        }
    }

    fn reconcile(&mut self) {
        let state = display::reconcile(&self.navigator);
        self.surface.render(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayState;
    use crossbeam_channel::Receiver;
    use tempfile::tempdir;

    /// Long enough that no real tick arrives during a test
    const NO_TICKS: Duration = Duration::from_secs(3600);

    #[derive(Default)]
    struct RecordingSurface {
        states: Vec<DisplayState>,
        playing: Vec<bool>,
        loading: Vec<bool>,
    }

    impl RecordingSurface {
        fn last(&self) -> &DisplayState {
            self.states.last().expect("nothing rendered")
        }
    }

    impl DisplaySurface for RecordingSurface {
        fn render(&mut self, state: &DisplayState) {
            self.states.push(state.clone());
        }
        fn set_playing(&mut self, playing: bool) {
            self.playing.push(playing);
        }
        fn set_loading(&mut self, loading: bool) {
            self.loading.push(loading);
        }
    }

    fn viewer(frames: usize) -> (Viewer<RecordingSurface>, Receiver<ViewerCommand>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut viewer = Viewer::new(RecordingSurface::default(), tx, NO_TICKS);
        if frames > 0 {
            viewer.load((0..frames).map(|i| Frame::new(format!("img/{}.png", i))).collect());
        }
        (viewer, rx)
    }

    #[test]
    fn test_new_viewer_renders_empty_state() {
        let (viewer, _rx) = viewer(0);
        assert!(!viewer.is_playing());
        assert_eq!(viewer.surface().states.len(), 1);
        assert!(viewer.surface().last().is_empty());
    }

    #[test]
    fn test_load_five_frames() {
        let (viewer, _rx) = viewer(5);
        assert_eq!(viewer.navigator().position(), Some(0));
        assert_eq!(viewer.surface().last().label, "Frame 1 / 5");
    }

    #[test]
    fn test_every_mutation_reconciles() {
        let (mut viewer, _rx) = viewer(3);
        let before = viewer.surface().states.len();
        viewer.seek(2);
        viewer.step_backward();
        viewer.step_forward();
        assert_eq!(viewer.surface().states.len(), before + 3);
        assert_eq!(viewer.surface().last().label, "Frame 3 / 3");
    }

    #[test]
    fn test_step_reports_boundary() {
        let (mut viewer, _rx) = viewer(2);
        assert!(!viewer.step_backward());
        assert!(viewer.step_forward());
        assert!(!viewer.step_forward());
        assert_eq!(viewer.navigator().position(), Some(1));
    }

    #[test]
    fn test_play_then_pause_keeps_position() {
        let (mut viewer, _rx) = viewer(4);
        viewer.seek(1);
        viewer.play();
        assert!(viewer.is_playing());
        viewer.pause();
        assert!(!viewer.is_playing());
        assert_eq!(viewer.navigator().position(), Some(1));
        assert_eq!(viewer.surface().playing, vec![true, false]);
    }

    #[test]
    fn test_play_is_idempotent() {
        let (mut viewer, _rx) = viewer(3);
        viewer.play();
        viewer.play();
        assert_eq!(viewer.surface().playing, vec![true]);
        viewer.pause();
        viewer.pause();
        assert_eq!(viewer.surface().playing, vec![true, false]);
    }

    #[test]
    fn test_play_ignored_when_empty() {
        let (mut viewer, _rx) = viewer(0);
        viewer.play();
        assert!(!viewer.is_playing());
        assert!(viewer.surface().playing.is_empty());
    }

    #[test]
    fn test_playback_ends_after_two_ticks_on_three_frames() {
        let (mut viewer, _rx) = viewer(3);
        viewer.play();

        viewer.tick();
        assert!(viewer.is_playing());
        assert_eq!(viewer.navigator().position(), Some(1));

        viewer.tick();
        assert!(!viewer.is_playing());
        assert_eq!(viewer.navigator().position(), Some(2));
    }

    #[test]
    fn test_play_at_last_frame_stops_on_first_tick() {
        let (mut viewer, _rx) = viewer(3);
        viewer.seek(2);
        viewer.play();
        assert!(viewer.is_playing());
        viewer.tick();
        assert!(!viewer.is_playing());
        assert_eq!(viewer.navigator().position(), Some(2));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let (mut viewer, _rx) = viewer(3);
        viewer.tick();
        assert_eq!(viewer.navigator().position(), Some(0));
    }

    #[test]
    fn test_toggle_play() {
        let (mut viewer, _rx) = viewer(3);
        viewer.toggle_play();
        assert!(viewer.is_playing());
        viewer.toggle_play();
        assert!(!viewer.is_playing());
    }

    #[test]
    fn test_load_stops_playback() {
        let (mut viewer, _rx) = viewer(3);
        viewer.play();
        viewer.load(vec![Frame::new("a.png")]);
        assert!(!viewer.is_playing());
        assert_eq!(viewer.surface().last().label, "Frame 1 / 1");
    }

    #[test]
    fn test_empty_viewer_ignores_navigation() {
        let (mut viewer, _rx) = viewer(0);
        viewer.seek(3);
        assert!(!viewer.step_forward());
        assert!(!viewer.step_backward());
        assert_eq!(viewer.navigator().position(), None);
        let state = viewer.surface().last();
        assert_eq!(state.label, "No frames found");
        assert!(!state.prev_enabled && !state.next_enabled && !state.scrub.enabled);
    }

    #[test]
    fn test_keys_and_commands() {
        let (mut viewer, _rx) = viewer(5);
        viewer.apply(ViewerCommand::Key("ArrowRight".to_string()));
        viewer.apply(ViewerCommand::Key("ArrowRight".to_string()));
        viewer.apply(ViewerCommand::Key("ArrowLeft".to_string()));
        viewer.apply(ViewerCommand::Key("ArrowUp".to_string()));
        assert_eq!(viewer.navigator().position(), Some(1));

        viewer.apply(ViewerCommand::Seek(-3));
        assert_eq!(viewer.navigator().position(), Some(0));
        viewer.apply(ViewerCommand::Seek(42));
        assert_eq!(viewer.navigator().position(), Some(4));
    }

    #[test]
    fn test_real_timer_plays_to_end() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut viewer = Viewer::new(RecordingSurface::default(), tx, Duration::from_millis(5));
        viewer.load((0..3).map(|i| Frame::new(format!("{}.png", i))).collect());
        viewer.play();

        let mut ticks = 0;
        while viewer.is_playing() {
            let cmd = rx.recv_timeout(Duration::from_secs(2)).expect("timer stalled");
            assert_eq!(cmd, ViewerCommand::Tick);
            viewer.apply(cmd);
            ticks += 1;
        }
        assert_eq!(ticks, 2);
        assert_eq!(viewer.navigator().position(), Some(2));
    }

    #[test]
    fn test_load_from_missing_manifest_shows_empty_state() {
        let dir = tempdir().expect("failed to create temp dir");
        let (mut viewer, _rx) = viewer(3);
        let location = ManifestLocation::from_img_dir(&dir.path().to_string_lossy());

        viewer.load_from(&location, 200);
        assert!(viewer.navigator().is_empty());
        assert!(viewer.surface().last().is_empty());
        assert_eq!(viewer.surface().loading, vec![true, false]);
    }

    #[test]
    fn test_load_from_empty_array() {
        let dir = tempdir().expect("failed to create temp dir");
        std::fs::write(dir.path().join("frames.json"), "[]").unwrap();
        let (mut viewer, _rx) = viewer(0);

        viewer.load_from(&ManifestLocation::from_img_dir(&dir.path().to_string_lossy()), 200);
        assert_eq!(viewer.navigator().len(), 0);
        assert_eq!(viewer.surface().last().label, "No frames found");
    }
}
