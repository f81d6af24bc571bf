// crates/vidsnap-core/src/session.rs
//
// The explicit playback state handed to every handler. Replaces the widget
// globals of a classic toolkit app: the controller owns the only mutable copy,
// panels get a shared reference each frame.

use std::time::Instant;

use crate::library::VideoEntry;

#[derive(Clone, Debug)]
pub struct PlaybackSession {
    pub current_entry:       Option<VideoEntry>,
    /// Mirrors the player's reported state, refreshed on every poll.
    pub is_playing:          bool,
    pub is_muted:            bool,
    /// Last commanded volume, 0–100.
    pub volume:              u8,
    /// Position shown on the time slider.
    pub position_millis:     u64,
    pub duration_millis:     u64,
    /// Set by every user seek; the poller stays off the slider for a grace
    /// window after it.
    pub last_manual_seek_at: Option<Instant>,
}

impl PlaybackSession {
    pub fn new(volume: u8) -> Self {
        Self {
            current_entry:       None,
            is_playing:          false,
            is_muted:            false,
            volume:              volume.min(100),
            position_millis:     0,
            duration_millis:     0,
            last_manual_seek_at: None,
        }
    }

    /// Writes the displayed position, keeping it inside the known duration.
    pub fn set_position(&mut self, millis: u64) {
        self.position_millis = if self.duration_millis > 0 {
            millis.min(self.duration_millis)
        } else {
            millis
        };
    }

    /// Position as a fraction of the duration, 0.0 when unknown.
    pub fn progress(&self) -> f64 {
        if self.duration_millis == 0 { return 0.0; }
        self.position_millis as f64 / self.duration_millis as f64
    }

    /// Forgets everything about the loaded media but keeps the audio settings.
    pub fn clear_media(&mut self) {
        self.current_entry       = None;
        self.is_playing          = false;
        self.position_millis     = 0;
        self.duration_millis     = 0;
        self.last_manual_seek_at = None;
    }
}

impl Default for PlaybackSession {
    fn default() -> Self { Self::new(100) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_never_exceeds_known_duration() {
        let mut s = PlaybackSession::default();
        s.set_position(5_000);
        assert_eq!(s.position_millis, 5_000); // duration unknown, no clamp

        s.duration_millis = 3_000;
        s.set_position(5_000);
        assert_eq!(s.position_millis, 3_000);
        assert_eq!(s.progress(), 1.0);
    }

    #[test]
    fn clear_media_keeps_audio_state() {
        let mut s = PlaybackSession::new(40);
        s.is_muted = true;
        s.duration_millis = 10;
        s.clear_media();
        assert_eq!((s.volume, s.is_muted, s.duration_millis), (40, true, 0));
    }
}
