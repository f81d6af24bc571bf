// crates/vidsnap-core/src/testing.rs
//
// Scripted player for driving the controller without FFmpeg.
// Compiled for this crate's tests and for other crates via the `test-util` feature.

use std::path::{Path, PathBuf};

use crate::error::{CaptureError, LoadError, PlaybackError};
use crate::player::{FrameSnapshot, MediaPlayer, PlayerState, VideoSurfaceBinder};

#[derive(Debug, Default)]
pub struct FakePlayer {
    pub loaded:         Option<PathBuf>,
    pub state:          PlayerState,
    pub time:           u64,
    pub length:         u64,
    pub fps:            Option<f64>,
    pub muted:          bool,
    pub volume_calls:   Vec<u8>,
    pub surfaces_bound: usize,
    pub stop_calls:     usize,
    pub released:       bool,
    pub fail_load:      bool,
    pub fail_play:      bool,
    pub fail_volume:    bool,
    /// Bytes written by `snapshot`; `None` makes the snapshot fail.
    pub snapshot_bytes: Option<Vec<u8>>,
}

impl FakePlayer {
    pub fn with_length(length: u64) -> Self {
        Self { length, ..Default::default() }
    }
}

impl FrameSnapshot for FakePlayer {
    fn snapshot(&self, dest: &Path) -> Result<(), CaptureError> {
        let bytes = self.snapshot_bytes.as_ref()
            .ok_or_else(|| CaptureError::Snapshot("no frame available".into()))?;
        std::fs::write(dest, bytes).map_err(|e| CaptureError::Snapshot(e.to_string()))
    }
}

impl MediaPlayer for FakePlayer {
    type Surface = ();

    fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        if self.fail_load {
            self.loaded = None;
            return Err(LoadError::Open { path: path.to_path_buf(), reason: "scripted".into() });
        }
        self.loaded = Some(path.to_path_buf());
        self.state  = PlayerState::Stopped;
        self.time   = 0;
        Ok(())
    }

    fn set_output(&mut self, _surface: ()) { self.surfaces_bound += 1; }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.fail_play || self.loaded.is_none() {
            return Err(PlaybackError::Play("scripted".into()));
        }
        self.state = PlayerState::Playing;
        Ok(())
    }

    fn pause(&mut self) { self.state = PlayerState::Paused; }

    fn stop(&mut self) {
        self.stop_calls += 1;
        self.state = PlayerState::Stopped;
        self.time  = 0;
    }

    fn state(&self)               -> PlayerState { self.state }
    fn time_millis(&self)         -> u64         { self.time }
    fn set_time_millis(&mut self, millis: u64)   { self.time = millis; }
    fn length_millis(&self)       -> u64         { self.length }
    fn frame_rate(&self)          -> Option<f64> { self.fps }

    fn set_volume(&mut self, volume: u8) -> Result<(), PlaybackError> {
        if self.fail_volume {
            return Err(PlaybackError::NoMedia);
        }
        self.volume_calls.push(volume);
        Ok(())
    }

    fn set_mute(&mut self, muted: bool) { self.muted = muted; }

    fn release(&mut self) {
        self.released = true;
        self.loaded   = None;
        self.state    = PlayerState::Stopped;
    }
}

/// Binder for players whose surface is `()`.
pub struct NullBinder;

impl VideoSurfaceBinder for NullBinder {
    type Surface = ();
    fn surface(&self) {}
}
