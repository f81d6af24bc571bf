// src/app.rs (vidsnap-ui)
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use eframe::egui;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vidsnap_capture::{begin_capture, CaptureEvent};
use vidsnap_core::commands::PlayerCommand;
use vidsnap_core::config::AppConfig;
use vidsnap_core::{ControlState, Notice, ScanOutcome};

use crate::context::AppContext;
use crate::helpers::shortcuts;
use crate::modules::{
    PanelModule, PanelState,
    library::LibraryModule,
    preview::PreviewModule,
    transport::TransportModule,
};
use crate::theme::{configure_style, notice_color, ACCENT, TEXT_DIM};

/// How often to look for capture results while jobs are outstanding.
const CAPTURE_POLL: Duration = Duration::from_millis(150);

/// What survives a restart.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    video_folder:  Option<PathBuf>,
    output_folder: Option<PathBuf>,
    volume:        u8,
    muted:         bool,
    config:        AppConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            video_folder:  None,
            // Screenshots land next to wherever the app was started from.
            output_folder: std::env::current_dir().ok(),
            volume:        config.initial_volume,
            muted:         false,
            config,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct AppStorage {
    settings: Settings,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct VidSnapApp {
    settings:     Settings,
    ctx:          AppContext,
    library:      LibraryModule,
    preview:      PreviewModule,
    transport:    TransportModule,
    /// Shown one at a time, oldest first.
    notices:      VecDeque<Notice>,
    /// One-line result of the last capture, shown in the top bar.
    status:       Option<String>,
    /// Last title pushed to the window, to avoid re-sending every frame.
    title:        String,
    /// Commands emitted by panels and shortcuts each frame, processed after the UI pass
    pending_cmds: Vec<PlayerCommand>,
}

impl VidSnapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, initial: Option<PathBuf>) -> Self {
        configure_style(&cc.egui_ctx);
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let settings = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .map(|d| d.settings)
            .unwrap_or_default();

        let mut ctx = AppContext::new(&cc.egui_ctx, settings.config.clone());
        ctx.controller.restore_audio(settings.volume, settings.muted);

        let preview = PreviewModule::new(ctx.surface.clone());
        let mut app = Self {
            settings,
            ctx,
            library:      LibraryModule::default(),
            preview,
            transport:    TransportModule,
            notices:      VecDeque::new(),
            status:       None,
            title:        String::new(),
            pending_cmds: Vec::new(),
        };
        app.open_initial(initial);
        app
    }

    /// A video named on the command line wins over the remembered folder.
    fn open_initial(&mut self, initial: Option<PathBuf>) {
        if let Some(video) = initial {
            let video = std::fs::canonicalize(&video).unwrap_or(video);
            if let Some(dir) = video.parent().map(Path::to_path_buf) {
                self.open_folder(&dir, Some(&video));
                return;
            }
        }
        if let Some(dir) = self.settings.video_folder.clone() {
            if dir.is_dir() {
                self.open_folder(&dir, None);
            } else {
                warn!("[library] remembered folder is gone: {}", dir.display());
            }
        }
    }

    fn push_notice(&mut self, notice: Notice) {
        info!("[app] notice {}: {}", notice.title, notice.message);
        self.notices.push_back(notice);
    }

    // ── Library ──────────────────────────────────────────────────────────────

    /// Scans `dir` and loads `focus` if it is in the list, else the first entry.
    fn open_folder(&mut self, dir: &Path, focus: Option<&Path>) {
        match self.ctx.library.load_folder(dir, &self.ctx.config) {
            Ok(ScanOutcome::Selected(first)) => {
                self.settings.video_folder = Some(dir.to_path_buf());
                let entry = focus
                    .and_then(|p| self.ctx.library.select_path(p).cloned())
                    .unwrap_or(first);
                if let Err(e) = self.ctx.controller.load(entry) {
                    self.push_notice(Notice::from(&e));
                }
            }
            Ok(ScanOutcome::Empty) => {
                self.settings.video_folder = Some(dir.to_path_buf());
                self.push_notice(Notice::info("Open folder", "No videos found!"));
            }
            Err(e) => self.push_notice(Notice::from(&e)),
        }
    }

    fn play_selected(&mut self) {
        let Some(entry) = self.ctx.library.selected_entry().cloned() else { return };
        if let Err(e) = self.ctx.controller.select_and_play(entry) {
            self.push_notice(Notice::from(&e));
        }
    }

    // ── Capture ──────────────────────────────────────────────────────────────

    fn start_capture(&mut self) {
        let result = begin_capture(self.settings.output_folder.as_deref(), self.ctx.controller.snapshot_source())
            .and_then(|req| self.ctx.capture.submit(req));
        match result {
            Ok(job_id) => {
                info!("[capture] queued {job_id}");
                self.ctx.captures.push(job_id);
                self.status = Some("Saving screenshot…".into());
            }
            Err(e) => self.push_notice(Notice::from(&e)),
        }
    }

    fn poll_captures(&mut self) {
        for event in self.ctx.drain_capture_events() {
            match event {
                CaptureEvent::Done(outcome) => {
                    let name = outcome.output_path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    self.status = Some(format!("Saved {name}"));
                    if !outcome.warnings.is_empty() {
                        self.push_notice(Notice::warning(
                            "Screenshot saved with warnings",
                            format!("{}\n\n{}", outcome.output_path.display(), outcome.warnings.join("\n")),
                        ));
                    }
                }
                CaptureEvent::Failed { error, .. } => {
                    self.status = None;
                    self.push_notice(Notice::from(&error));
                }
                CaptureEvent::Cancelled { job_id } => {
                    info!("[capture] {job_id} cancelled");
                    self.status = Some("Screenshot cancelled".into());
                }
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    fn process_command(&mut self, cmd: PlayerCommand, egui_ctx: &egui::Context) {
        let now = Instant::now();
        match cmd {
            // ── Library ──────────────────────────────────────────────────────
            PlayerCommand::OpenVideoFolder(dir) => {
                self.open_folder(&dir, None);
            }
            PlayerCommand::SetOutputFolder(dir) => {
                info!("[capture] output folder {}", dir.display());
                self.settings.output_folder = Some(dir);
            }
            PlayerCommand::SelectEntry(index) => {
                if self.ctx.library.select(index).is_some() {
                    self.play_selected();
                }
            }
            PlayerCommand::MoveSelection(delta) => {
                if self.ctx.library.select_relative(delta).is_some() {
                    self.play_selected();
                }
            }

            // ── Playback ─────────────────────────────────────────────────────
            PlayerCommand::TogglePlayPause => {
                if let Err(e) = self.ctx.controller.toggle_play_pause() {
                    self.push_notice(Notice::from(&e));
                }
            }
            PlayerCommand::Stop => self.ctx.controller.stop(),
            PlayerCommand::SeekFraction(f) => {
                self.ctx.controller.seek_fraction(f, now);
            }
            PlayerCommand::Step(frames) => {
                self.ctx.controller.step(frames, now);
            }
            PlayerCommand::SetVolume(volume) => {
                match self.ctx.controller.set_volume(volume) {
                    Ok(())  => self.settings.volume = self.ctx.controller.session().volume,
                    Err(e)  => self.push_notice(Notice::from(&e)),
                }
            }
            PlayerCommand::ToggleMute => {
                self.ctx.controller.toggle_mute();
                self.settings.muted = self.ctx.controller.session().is_muted;
            }

            // ── Capture ──────────────────────────────────────────────────────
            PlayerCommand::Capture => self.start_capture(),
            PlayerCommand::CancelCapture(job_id) => self.ctx.capture.cancel(job_id),

            // ── View ─────────────────────────────────────────────────────────
            PlayerCommand::DismissNotice => {
                self.notices.pop_front();
            }
            PlayerCommand::Close => {
                egui_ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn sync_title(&mut self, egui_ctx: &egui::Context, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            egui_ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.title.clone()));
        }
    }

    fn show_notice(&mut self, egui_ctx: &egui::Context) {
        let Some(notice) = self.notices.front() else { return };
        let mut dismiss = false;

        let resp = egui::Modal::new(egui::Id::new("notice_modal")).show(egui_ctx, |ui| {
            ui.set_max_width(420.0);
            ui.label(egui::RichText::new(&notice.title).strong().size(14.0).color(notice_color(notice.level)));
            ui.add_space(6.0);
            ui.label(&notice.message);
            ui.add_space(10.0);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("  OK  ").clicked() {
                    dismiss = true;
                }
            });
        });
        if dismiss || resp.should_close() {
            self.pending_cmds.push(PlayerCommand::DismissNotice);
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for VidSnapApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &AppStorage { settings: self.settings.clone() });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.ctx.shutdown();
    }

    fn update(&mut self, egui_ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ctx.poll_if_due(Instant::now());
        self.poll_captures();

        // Shortcuts are ignored while a notice is up or a text field has focus.
        if self.notices.is_empty() && !egui_ctx.wants_keyboard_input() {
            let control = self.ctx.controller.state();
            let keys    = egui_ctx.input(|i| shortcuts::pressed(i, control));
            self.pending_cmds.extend(keys);
        }

        let labels = self.ctx.controller.labels();
        self.sync_title(egui_ctx, &labels.title);

        let state = PanelState {
            library:       &self.ctx.library,
            session:       self.ctx.controller.session(),
            control:       self.ctx.controller.state(),
            labels:        &labels,
            output_folder: self.settings.output_folder.as_deref(),
            captures:      &self.ctx.captures,
        };

        egui::TopBottomPanel::top("top_panel")
            .exact_height(32.0)
            .show(egui_ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(egui::RichText::new("📷 VidSnap").strong().size(15.0).color(ACCENT));
                    ui.separator();
                    let status = self.status.as_deref().unwrap_or("Space play/pause · S capture · ←/→ frame");
                    ui.label(egui::RichText::new(status).size(12.0).color(TEXT_DIM));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Quit").clicked() {
                            self.pending_cmds.push(PlayerCommand::Close);
                        }
                    });
                });
            });

        egui::SidePanel::left("library_panel")
            .resizable(true)
            .default_width(260.0)
            .min_width(180.0)
            .show(egui_ctx, |ui| {
                self.library.ui(ui, &state, &mut self.pending_cmds);
            });

        egui::TopBottomPanel::bottom("transport_panel")
            .frame(egui::Frame::side_top_panel(&egui_ctx.style()).inner_margin(egui::Margin::symmetric(10, 8)))
            .show(egui_ctx, |ui| {
                self.transport.ui(ui, &state, &mut self.pending_cmds);
            });

        egui::CentralPanel::default().show(egui_ctx, |ui| {
            self.preview.ui(ui, &state, &mut self.pending_cmds);
        });

        self.show_notice(egui_ctx);

        // ── Process commands emitted this frame ───────────────────────────────
        let cmds: Vec<PlayerCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd, egui_ctx);
        }

        // Frames wake the UI through the surface; the slider and capture
        // results need a timer of their own.
        if self.ctx.controller.state() == ControlState::Playing {
            egui_ctx.request_repaint_after(self.ctx.config.poll_interval());
        }
        if !self.ctx.captures.is_empty() {
            egui_ctx.request_repaint_after(CAPTURE_POLL);
        }
    }
}
