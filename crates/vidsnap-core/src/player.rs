// crates/vidsnap-core/src/player.rs
//
// The playback collaborator, seen from the controller.
//
// Everything that actually decodes, renders, seeks or snapshots lives behind
// MediaPlayer. vidsnap-media provides the FFmpeg implementation; tests use
// testing::FakePlayer.

use std::path::Path;

use crate::error::{CaptureError, LoadError, PlaybackError};

/// What the player says it is doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    Stopped,
    Playing,
    Paused,
    /// Reached the end of the stream on its own.
    Ended,
}

/// Writes the currently presented frame to a file.
///
/// Split from MediaPlayer and taking `&self` so the capture pipeline can borrow
/// the player for a snapshot without any way to change playback state.
pub trait FrameSnapshot {
    fn snapshot(&self, dest: &Path) -> Result<(), CaptureError>;
}

pub trait MediaPlayer: FrameSnapshot {
    /// Where decoded video goes. For the egui target this is a frame slot that
    /// the preview panel uploads into a texture.
    type Surface;

    /// Opens `path` and makes it the current media. Does not start playback.
    fn load(&mut self, path: &Path) -> Result<(), LoadError>;
    fn set_output(&mut self, surface: Self::Surface);
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn stop(&mut self);
    fn state(&self) -> PlayerState;
    fn time_millis(&self) -> u64;
    fn set_time_millis(&mut self, millis: u64);
    /// 0 until the length is known.
    fn length_millis(&self) -> u64;
    fn frame_rate(&self) -> Option<f64>;
    fn set_volume(&mut self, volume: u8) -> Result<(), PlaybackError>;
    fn set_mute(&mut self, muted: bool);
    /// Drops the current media and any decode resources.
    fn release(&mut self);
    /// Housekeeping hook, called once per poll tick.
    fn refresh(&mut self) {}
}

/// Supplies the output surface the player renders into.
///
/// One implementation per target. The controller re-binds on every load, so it
/// never needs to know which platform or toolkit is underneath.
pub trait VideoSurfaceBinder {
    type Surface;
    fn surface(&self) -> Self::Surface;
}
