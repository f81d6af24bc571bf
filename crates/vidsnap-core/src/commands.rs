// crates/vidsnap-core/src/commands.rs
//
// Every user action is expressed as a PlayerCommand.
// Panels emit these; app.rs processes them after the UI pass.
// Adding a new action = add a variant here + one match arm in app.rs.

use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    // ── Library ──────────────────────────────────────────────────────────────
    OpenVideoFolder(PathBuf),
    SetOutputFolder(PathBuf),
    SelectEntry(usize),
    /// Keyboard Up/Down in the list.
    MoveSelection(isize),

    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePlayPause,
    Stop,
    /// Slider drag, as a fraction of the duration.
    SeekFraction(f64),
    /// Relative seek by whole frames (negative = backwards).
    Step(i32),
    SetVolume(i32),
    ToggleMute,

    // ── Capture ──────────────────────────────────────────────────────────────
    Capture,
    CancelCapture(Uuid),

    // ── View ─────────────────────────────────────────────────────────────────
    DismissNotice,
    Close,
}
