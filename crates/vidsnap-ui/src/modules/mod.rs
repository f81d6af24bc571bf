// crates/vidsnap-ui/src/modules/mod.rs
//
// Panel registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing PanelModule
//   2. Add `pub mod mypanel;` below
//   3. Give VidSnapApp a field for it and call ui() from update()

pub mod library;
pub mod preview;
pub mod transport;

use std::path::Path;

use egui::Ui;
use uuid::Uuid;
use vidsnap_core::commands::PlayerCommand;
use vidsnap_core::{ControlLabels, ControlState, PlaybackSession, VideoLibrary};

/// Read-only view of everything a panel may draw, rebuilt every frame.
pub struct PanelState<'a> {
    pub library:       &'a VideoLibrary,
    pub session:       &'a PlaybackSession,
    pub control:       ControlState,
    pub labels:        &'a ControlLabels,
    pub output_folder: Option<&'a Path>,
    /// Captures still being post-processed, oldest first.
    pub captures:      &'a [Uuid],
}

/// Every panel implements this trait.
/// Panels read state and emit commands; they never mutate state directly.
pub trait PanelModule {
    fn name(&self) -> &str;
    fn ui(&mut self, ui: &mut Ui, state: &PanelState<'_>, cmd: &mut Vec<PlayerCommand>);
}
