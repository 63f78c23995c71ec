//! Playback state and the periodic driver.
//!
//! [`Playback::Running`] owns the [`PlaybackTimer`], so "timer exists iff
//! running" holds by construction and there is never more than one timer.
//! The timer thread never touches viewer state: it only sends
//! [`ViewerCommand::Tick`] into the command channel. Dropping the timer stops
//! and joins its thread.

use std::fmt;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, select};
use log::trace;

use crate::core::events::ViewerCommand;

/// Cancellable periodic tick source
pub struct PlaybackTimer {
    period: Duration,
    stop_tx: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PlaybackTimer {
    /// Spawn the timer thread. The first tick fires one `period` after start.
    pub fn start(period: Duration, ticks: Sender<ViewerCommand>) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("frameview-playback".to_string())
            .spawn(move || {
                trace!("Playback timer started ({:?})", period);
                let ticker = crossbeam_channel::tick(period);
                loop {
                    select! {
                        // Sender dropped = cancelled
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            if ticks.send(ViewerCommand::Tick).is_err() {
                                break;
                            }
                        }
                    }
                }
                trace!("Playback timer stopped");
            })?;

        Ok(Self {
            period,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for PlaybackTimer {
    fn drop(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl fmt::Debug for PlaybackTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackTimer")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

/// Idle, or running with the one active timer
#[derive(Debug, Default)]
pub enum Playback {
    #[default]
    Idle,
    Running(PlaybackTimer),
}

impl Playback {
    pub fn is_running(&self) -> bool {
        matches!(self, Playback::Running(_))
    }

    /// Cancel the timer if running. Returns true if a transition happened.
    pub fn stop(&mut self) -> bool {
        match std::mem::take(self) {
            Playback::Running(timer) => {
                drop(timer);
                true
            }
            Playback::Idle => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_timer_delivers_ticks() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let timer = PlaybackTimer::start(Duration::from_millis(5), tx).unwrap();

        for _ in 0..3 {
            let cmd = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(cmd, ViewerCommand::Tick);
        }
        drop(timer);
    }

    #[test]
    fn test_drop_stops_ticks() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let timer = PlaybackTimer::start(Duration::from_millis(5), tx).unwrap();
        rx.recv_timeout(Duration::from_secs(2)).unwrap();

        // Joins the timer thread, so its sender is gone afterwards
        drop(timer);
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert!(rx.is_empty());
    }

    #[test]
    fn test_drop_does_not_wait_for_period() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let timer = PlaybackTimer::start(Duration::from_secs(3600), tx).unwrap();
        let start = Instant::now();
        drop(timer);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_stop_transitions_once() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut playback =
            Playback::Running(PlaybackTimer::start(Duration::from_secs(3600), tx).unwrap());
        assert!(playback.is_running());
        assert!(playback.stop());
        assert!(!playback.is_running());
        assert!(!playback.stop());
    }
}
