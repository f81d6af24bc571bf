// crates/vidsnap-core/src/config.rs
//
// Tunables for the library scanner and the playback controller.
// Plain serde data so the UI can persist it alongside the user's folders.

use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Extensions recognised as video, compared case-insensitively, no leading dot.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp4", "mpeg", "mpg", "avi", "mov", "flv", "mkv"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_extensions")]
    pub recognized_extensions: Vec<String>,
    /// Position poll interval.
    #[serde(default = "default_poll_ms")]
    pub poll_interval_ms:      u64,
    /// How long after a manual seek the poller keeps its hands off the slider.
    #[serde(default = "default_grace_ms")]
    pub seek_grace_ms:         u64,
    /// Used by frame stepping when the stream does not report a frame rate.
    #[serde(default = "default_fps")]
    pub default_fps:           f64,
    #[serde(default = "default_volume")]
    pub initial_volume:        u8,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}
fn default_poll_ms()  -> u64 { 100 }
fn default_grace_ms() -> u64 { 2_000 }
fn default_fps()      -> f64 { 25.0 }
fn default_volume()   -> u8  { 100 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recognized_extensions: default_extensions(),
            poll_interval_ms:      default_poll_ms(),
            seek_grace_ms:         default_grace_ms(),
            default_fps:           default_fps(),
            initial_volume:        default_volume(),
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms) }
    pub fn seek_grace(&self)    -> Duration { Duration::from_millis(self.seek_grace_ms) }

    /// True when `ext` (without the dot) is one of the recognised extensions.
    pub fn is_recognized(&self, ext: &str) -> bool {
        self.recognized_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        let cfg = AppConfig::default();
        assert!(cfg.is_recognized("MOV"));
        assert!(cfg.is_recognized("mkv"));
        assert!(!cfg.is_recognized("txt"));
    }

    #[test]
    fn durations_come_from_millis() {
        let cfg = AppConfig { seek_grace_ms: 1_500, ..Default::default() };
        assert_eq!(cfg.seek_grace(), Duration::from_millis(1_500));
        assert_eq!(cfg.poll_interval(), Duration::from_millis(100));
    }
}
