// crates/vidsnap-core/src/media_types.rs
//
// Types that flow between the playback collaborator and the UI.
// No egui, no ffmpeg. Just plain data.

/// A decoded frame ready for display.
#[derive(Clone)]
pub struct PlaybackFrame {
    /// Presentation time in seconds from the start of the file.
    pub timestamp: f64,
    pub width:     u32,
    pub height:    u32,
    pub data:      Vec<u8>, // RGBA
}

impl std::fmt::Debug for PlaybackFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackFrame")
            .field("timestamp", &self.timestamp)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Stream facts the player learns when media is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StreamInfo {
    pub duration_millis: u64,
    /// Average frame rate, when the container reports one.
    pub frame_rate:      Option<f64>,
    pub width:           u32,
    pub height:          u32,
    pub has_audio:       bool,
}
