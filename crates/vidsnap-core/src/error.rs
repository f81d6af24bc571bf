// crates/vidsnap-core/src/error.rs
//
// Error taxonomy shared by every crate in the workspace.
//
// None of these terminate the application. Each is caught where the external
// call was made and turned into a Notice, which the UI shows as a modal.

use std::path::PathBuf;
use thiserror::Error;

/// Bad or missing media path, or a folder that cannot be listed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no such file: {}", .0.display())]
    Missing(PathBuf),
    #[error("cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },
    #[error("cannot read folder {}: {source}", path.display())]
    Unreadable {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The player rejected a play or audio command.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Unable to play the video.")]
    Play(String),
    #[error("Failed to set the volume: {label}.")]
    Volume { label: String },
    #[error("nothing is loaded")]
    NoMedia,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("First you need to set the output directory")]
    NoOutputFolder,
    #[error("output directory does not exist: {}", .0.display())]
    OutputFolderMissing(PathBuf),
    #[error("No video selected")]
    NoSelection,
    #[error("snapshot failed: {0}")]
    Snapshot(String),
    #[error("capture cancelled")]
    Cancelled,
    #[error("too many captures are still being processed")]
    Busy,
    #[error("could not finalize {}: {source}", path.display())]
    Finalize {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Metadata read failure. Treated as "no rotation, no special codec".
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("ffprobe could not be started: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("ffprobe exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("unparseable ffprobe output: {0}")]
    Parse(String),
}

/// Decode / rotate / save failure after a snapshot already exists on disk.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("unsupported rotation of {0} degrees")]
    Rotation(i32),
    #[error("cannot save {}: {reason}", path.display())]
    Save { path: PathBuf, reason: String },
}

/// Failure of a composite controller action (load followed by play).
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

// ── Notices ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible, non-fatal message. Produced from any of the errors above.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title:   String,
    pub message: String,
    pub level:   NoticeLevel,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), level: NoticeLevel::Info }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), level: NoticeLevel::Warning }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), level: NoticeLevel::Error }
    }
}

impl From<&LoadError> for Notice {
    fn from(e: &LoadError) -> Self { Notice::error("Open video", e.to_string()) }
}

impl From<&PlaybackError> for Notice {
    fn from(e: &PlaybackError) -> Self { Notice::error("Playback", e.to_string()) }
}

impl From<&ControlError> for Notice {
    fn from(e: &ControlError) -> Self {
        match e {
            ControlError::Load(e)     => e.into(),
            ControlError::Playback(e) => e.into(),
        }
    }
}

impl From<&CaptureError> for Notice {
    fn from(e: &CaptureError) -> Self {
        match e {
            // Precondition misses, not failures: shown as a plain info box.
            CaptureError::NoOutputFolder | CaptureError::NoSelection => {
                Notice::info("Capture", e.to_string())
            }
            _ => Notice::error("Capture", e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_output_folder_is_informational() {
        let n = Notice::from(&CaptureError::NoOutputFolder);
        assert_eq!(n.level, NoticeLevel::Info);
        assert!(n.message.contains("output directory"));
    }

    #[test]
    fn snapshot_failure_is_an_error_notice() {
        let n = Notice::from(&CaptureError::Snapshot("decoder gone".into()));
        assert_eq!(n.level, NoticeLevel::Error);
        assert!(n.message.contains("decoder gone"));
    }

    #[test]
    fn volume_error_names_the_level() {
        let e = PlaybackError::Volume { label: "40 (Muted)".into() };
        assert_eq!(e.to_string(), "Failed to set the volume: 40 (Muted).");
    }
}
