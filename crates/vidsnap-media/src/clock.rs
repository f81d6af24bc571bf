// crates/vidsnap-media/src/clock.rs
//
// PlaybackClock: the single notion of "where are we" shared by the player,
// the decode thread (frame pacing) and snapshot (which frame to grab).
// Wall-clock driven while running; frozen while paused or stopped.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug)]
struct ClockState {
    /// Position when the clock was last started or moved.
    base:    Duration,
    /// Set while running.
    started: Option<Instant>,
}

#[derive(Clone, Debug)]
pub struct PlaybackClock {
    inner: Arc<Mutex<ClockState>>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self { inner: Arc::new(Mutex::new(ClockState { base: Duration::ZERO, started: None })) }
    }
}

impl PlaybackClock {
    pub fn new() -> Self { Self::default() }

    pub fn position(&self) -> Duration {
        self.position_at(Instant::now())
    }

    pub fn position_at(&self, now: Instant) -> Duration {
        let s = self.inner.lock();
        match s.started {
            Some(t0) => s.base + now.saturating_duration_since(t0),
            None     => s.base,
        }
    }

    pub fn secs(&self) -> f64 { self.position().as_secs_f64() }

    pub fn is_running(&self) -> bool { self.inner.lock().started.is_some() }

    pub fn start_at(&self, now: Instant) {
        let mut s = self.inner.lock();
        if s.started.is_none() {
            s.started = Some(now);
        }
    }

    pub fn pause_at(&self, now: Instant) {
        let mut s = self.inner.lock();
        if let Some(t0) = s.started.take() {
            s.base += now.saturating_duration_since(t0);
        }
    }

    /// Moves to `pos`, keeping the running/paused state.
    pub fn seek_at(&self, pos: Duration, now: Instant) {
        let mut s = self.inner.lock();
        s.base = pos;
        if s.started.is_some() {
            s.started = Some(now);
        }
    }

    /// Stopped at zero.
    pub fn reset(&self) {
        let mut s = self.inner.lock();
        s.base    = Duration::ZERO;
        s.started = None;
    }

    pub fn start(&self)                { self.start_at(Instant::now()) }
    pub fn pause(&self)                { self.pause_at(Instant::now()) }
    pub fn seek(&self, pos: Duration)  { self.seek_at(pos, Instant::now()) }
}
