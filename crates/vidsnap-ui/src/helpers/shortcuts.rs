// crates/vidsnap-ui/src/helpers/shortcuts.rs
//
// Keyboard → PlayerCommand. Only consulted when no text field has focus.
//
//   S      capture (only with a running decoder)
//   Space  play / pause
//   D      stop
//   ← / →  step one frame
//   M      mute
//   ↑ / ↓  move the list selection

use egui::Key;
use vidsnap_core::commands::PlayerCommand;
use vidsnap_core::ControlState;

pub const KEYS: [Key; 8] = [
    Key::S, Key::Space, Key::D, Key::ArrowLeft, Key::ArrowRight, Key::M, Key::ArrowUp, Key::ArrowDown,
];

pub fn command_for_key(key: Key, control: ControlState) -> Option<PlayerCommand> {
    let loaded = control != ControlState::Idle;
    match key {
        Key::S          if control.can_seek() => Some(PlayerCommand::Capture),
        Key::Space      if loaded             => Some(PlayerCommand::TogglePlayPause),
        Key::D          if control.can_seek() => Some(PlayerCommand::Stop),
        Key::ArrowLeft  if control.can_seek() => Some(PlayerCommand::Step(-1)),
        Key::ArrowRight if control.can_seek() => Some(PlayerCommand::Step(1)),
        Key::M                                => Some(PlayerCommand::ToggleMute),
        Key::ArrowUp                          => Some(PlayerCommand::MoveSelection(-1)),
        Key::ArrowDown                        => Some(PlayerCommand::MoveSelection(1)),
        _                                     => None,
    }
}

/// Commands for every shortcut pressed this frame, in KEYS order.
pub fn pressed(input: &egui::InputState, control: ControlState) -> Vec<PlayerCommand> {
    if input.modifiers.any() {
        return Vec::new();
    }
    KEYS.iter()
        .filter(|k| input.key_pressed(**k))
        .filter_map(|k| command_for_key(*k, control))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_needs_a_running_decoder() {
        assert_eq!(command_for_key(Key::S, ControlState::Idle), None);
        assert_eq!(command_for_key(Key::S, ControlState::LoadedStopped), None);
        assert_eq!(command_for_key(Key::S, ControlState::Playing), Some(PlayerCommand::Capture));
        assert_eq!(command_for_key(Key::S, ControlState::Paused), Some(PlayerCommand::Capture));
    }

    #[test]
    fn space_toggles_once_something_is_loaded() {
        assert_eq!(command_for_key(Key::Space, ControlState::Idle), None);
        assert_eq!(command_for_key(Key::Space, ControlState::LoadedStopped), Some(PlayerCommand::TogglePlayPause));
    }

    #[test]
    fn arrows_step_and_move() {
        assert_eq!(command_for_key(Key::ArrowLeft, ControlState::Paused), Some(PlayerCommand::Step(-1)));
        assert_eq!(command_for_key(Key::ArrowRight, ControlState::Playing), Some(PlayerCommand::Step(1)));
        assert_eq!(command_for_key(Key::ArrowUp, ControlState::Idle), Some(PlayerCommand::MoveSelection(-1)));
        assert_eq!(command_for_key(Key::ArrowDown, ControlState::Idle), Some(PlayerCommand::MoveSelection(1)));
    }

    #[test]
    fn unmapped_keys_do_nothing() {
        assert_eq!(command_for_key(Key::Q, ControlState::Playing), None);
    }
}
