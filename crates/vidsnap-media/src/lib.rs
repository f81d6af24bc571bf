// crates/vidsnap-media/src/lib.rs
//
// FFmpeg-backed playback collaborator. No egui dependency: decoded frames
// reach the UI through a FrameSurface, everything else through the
// vidsnap_core::MediaPlayer trait.

pub mod audio;
pub mod clock;
pub mod decode;
pub mod player;
pub mod probe;
pub mod surface;

pub use clock::PlaybackClock;
pub use player::FfmpegPlayer;
pub use surface::FrameSurface;

use ffmpeg_the_third as ffmpeg;

/// Must run once before the first FfmpegPlayer is created.
pub fn init() -> Result<(), ffmpeg::Error> {
    ffmpeg::init()
}

/// libavutil version as `major.minor.micro`.
pub fn ffmpeg_version() -> String {
    let v = ffmpeg::util::version();
    format!("{}.{}.{}", v >> 16, (v >> 8) & 0xff, v & 0xff)
}
