// crates/vidsnap-ui/src/modules/library.rs
//
// Left panel: folder picker on top, the scanned videos below, and a short
// detail footer for the selected entry. Clicking a row emits SelectEntry.

use super::{PanelModule, PanelState};
use crate::helpers::format::{fit_name, folder_label};
use crate::theme::{ACCENT, BG_2, TEXT_DIM};
use egui::{Align, Layout, RichText, Ui};
use rfd::FileDialog;
use vidsnap_core::commands::PlayerCommand;

/// Characters of a list label before it is cut with "…".
const NAME_CHARS:   usize = 38;
const FOLDER_CHARS: usize = 34;

#[derive(Default)]
pub struct LibraryModule {
    /// Selection the list last scrolled to, so keyboard moves stay in view.
    scrolled_to: Option<usize>,
}

impl PanelModule for LibraryModule {
    fn name(&self) -> &str { "Videos" }

    fn ui(&mut self, ui: &mut Ui, state: &PanelState<'_>, cmd: &mut Vec<PlayerCommand>) {
        let library = state.library;

        // ── Header ───────────────────────────────────────────────────────────
        egui::Frame::new()
            .fill(BG_2)
            .inner_margin(egui::Margin { left: 8, right: 8, top: 6, bottom: 6 })
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("🗂 {}", self.name())).size(12.0).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button(RichText::new("📂 Open folder…").size(11.0)).clicked() {
                            let mut dialog = FileDialog::new().set_title("Choose a folder of videos");
                            if let Some(dir) = library.folder() {
                                dialog = dialog.set_directory(dir);
                            }
                            if let Some(dir) = dialog.pick_folder() {
                                cmd.push(PlayerCommand::OpenVideoFolder(dir));
                            }
                        }
                    });
                });
                ui.label(
                    RichText::new(folder_label(library.folder(), FOLDER_CHARS))
                        .size(10.0).color(TEXT_DIM),
                );
            });

        ui.separator();

        // ── Footer: details of the selected file ─────────────────────────────
        egui::TopBottomPanel::bottom("library_details")
            .frame(egui::Frame::new().inner_margin(egui::Margin::symmetric(8, 6)))
            .show_inside(ui, |ui| match library.selected_entry() {
                Some(entry) => {
                    ui.label(RichText::new(fit_name(&entry.display_name, NAME_CHARS)).strong());
                    ui.label(RichText::new(entry.modified_label()).size(10.0).color(TEXT_DIM).monospace());
                }
                None => {
                    ui.label(RichText::new("Nothing selected").size(10.0).color(TEXT_DIM));
                }
            });

        // ── List ─────────────────────────────────────────────────────────────
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if library.is_empty() {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        let hint = if library.folder().is_some() {
                            "No videos found!"
                        } else {
                            "Open a folder to list its videos"
                        };
                        ui.label(RichText::new("🎬").size(30.0));
                        ui.add_space(6.0);
                        ui.label(RichText::new(hint).size(11.0).color(TEXT_DIM));
                    });
                    return;
                }

                let selected = library.selected();
                ui.with_layout(Layout::top_down_justified(Align::LEFT), |ui| {
                    for (i, entry) in library.entries().iter().enumerate() {
                        let is_selected = selected == Some(i);
                        let is_current  = state.session.current_entry.as_ref()
                            .is_some_and(|c| c.path == entry.path);

                        let mut text = RichText::new(fit_name(&entry.display_name, NAME_CHARS)).size(11.5);
                        if is_current {
                            text = text.color(ACCENT);
                        }
                        let resp = ui.selectable_label(is_selected, text)
                            .on_hover_text(entry.path.display().to_string());

                        if resp.clicked() && !is_current {
                            cmd.push(PlayerCommand::SelectEntry(i));
                        }
                        if is_selected && self.scrolled_to != Some(i) {
                            resp.scroll_to_me(None);
                            self.scrolled_to = Some(i);
                        }
                    }
                });
                ui.add_space(6.0);
                ui.label(
                    RichText::new(format!("{} videos · ↑/↓ to move", library.entries().len()))
                        .size(9.5).color(TEXT_DIM),
                );
            });
    }
}
