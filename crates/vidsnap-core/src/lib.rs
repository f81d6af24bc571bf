// crates/vidsnap-core/src/lib.rs
//
// Pure data and control logic. No egui or ffmpeg in here.
// The playback collaborator is reached only through the MediaPlayer trait,
// so everything in here can be driven by a scripted fake in tests.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod helpers;
pub mod library;
pub mod media_types;
pub mod player;
pub mod session;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use controller::{ControlLabels, ControlState, PlaybackController};
pub use error::{CaptureError, ControlError, ImageError, LoadError, Notice, NoticeLevel, PlaybackError, ProbeError};
pub use library::{ScanOutcome, VideoEntry, VideoLibrary};
pub use player::{FrameSnapshot, MediaPlayer, PlayerState, VideoSurfaceBinder};
pub use session::PlaybackSession;
