// crates/vidsnap-ui/src/modules/transport.rs
//
// Bottom bar under the preview:
//
//   [━━━━━━━━━━━━━━━━━━━━━ time slider ━━━━━━━━━━━━━━━━━━━━━]  01:02 / 04:10
//   [Play] [Stop] [◀ Frame] [Frame ▶]   [Mute] Volume ━━━━   [Output…] [📷 Capture]
//
// Everything here is a command emitter. Labels come from the controller so the
// buttons always say what the state machine will do next.

use super::{PanelModule, PanelState};
use crate::helpers::format::folder_label;
use crate::theme::{ACCENT, TEXT_DIM};
use egui::{Align, Layout, RichText, Slider, Ui};
use rfd::FileDialog;
use vidsnap_core::commands::PlayerCommand;
use vidsnap_core::helpers::time::format_progress;

const TIME_LABEL_W: f32 = 120.0;
const VOLUME_W:     f32 = 110.0;

pub struct TransportModule;

impl PanelModule for TransportModule {
    fn name(&self) -> &str { "Transport" }

    fn ui(&mut self, ui: &mut Ui, state: &PanelState<'_>, cmd: &mut Vec<PlayerCommand>) {
        let session  = state.session;
        let can_seek = state.control.can_seek();
        let loaded   = session.current_entry.is_some();

        // ── Time slider ──────────────────────────────────────────────────────
        ui.horizontal(|ui| {
            let mut fraction = session.progress();
            ui.spacing_mut().slider_width = (ui.available_width() - TIME_LABEL_W).max(60.0);
            let resp = ui.add_enabled(
                can_seek,
                Slider::new(&mut fraction, 0.0..=1.0).show_value(false),
            );
            if resp.changed() {
                cmd.push(PlayerCommand::SeekFraction(fraction));
            }
            ui.label(
                RichText::new(format_progress(session.position_millis, session.duration_millis))
                    .monospace().size(11.0).color(if can_seek { ACCENT } else { TEXT_DIM }),
            );
        });

        ui.add_space(2.0);

        // ── Buttons ──────────────────────────────────────────────────────────
        ui.horizontal(|ui| {
            if ui.add_enabled(loaded, egui::Button::new(state.labels.play_pause)).clicked() {
                cmd.push(PlayerCommand::TogglePlayPause);
            }
            if ui.add_enabled(can_seek, egui::Button::new("⏹ Stop (D)")).clicked() {
                cmd.push(PlayerCommand::Stop);
            }
            if ui.add_enabled(can_seek, egui::Button::new("◀ Frame")).on_hover_text("Left arrow").clicked() {
                cmd.push(PlayerCommand::Step(-1));
            }
            if ui.add_enabled(can_seek, egui::Button::new("Frame ▶")).on_hover_text("Right arrow").clicked() {
                cmd.push(PlayerCommand::Step(1));
            }

            ui.separator();

            if ui.button(state.labels.mute).on_hover_text("M").clicked() {
                cmd.push(PlayerCommand::ToggleMute);
            }
            let mut volume = i32::from(session.volume);
            ui.spacing_mut().slider_width = VOLUME_W;
            let resp = ui.add_enabled(
                loaded,
                Slider::new(&mut volume, 0..=100).show_value(false),
            );
            if resp.changed() {
                cmd.push(PlayerCommand::SetVolume(volume));
            }
            ui.label(RichText::new(&state.labels.volume).size(11.0).color(TEXT_DIM));

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let capture = egui::Button::new(RichText::new("📷 Capture (S)").strong());
                if ui.add_enabled(can_seek, capture).clicked() {
                    cmd.push(PlayerCommand::Capture);
                }
                if let Some(&newest) = state.captures.last() {
                    if ui.small_button("✖ Cancel save").clicked() {
                        cmd.push(PlayerCommand::CancelCapture(newest));
                    }
                }

                ui.label(
                    RichText::new(folder_label(state.output_folder, 28)).size(10.0).color(TEXT_DIM),
                );
                if ui.button("Output folder…").clicked() {
                    let mut dialog = FileDialog::new().set_title("Save screenshots to");
                    if let Some(dir) = state.output_folder {
                        dialog = dialog.set_directory(dir);
                    }
                    if let Some(dir) = dialog.pick_folder() {
                        cmd.push(PlayerCommand::SetOutputFolder(dir));
                    }
                }
            });
        });
    }
}
