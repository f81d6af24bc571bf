// crates/vidsnap-ui/src/context.rs
//
// AppContext owns every runtime handle that is NOT part of the persisted
// settings. VidSnapApp holds one of these plus its Settings and the panels.
//
//   AppContext
//     ├── library     the scanned folder and its selection
//     ├── controller  PlaybackController over the FFmpeg player
//     ├── surface     frame slot the player decodes into, read by the preview
//     ├── capture     background capture worker and its event channel
//     └── captures    job ids submitted and not yet reported back

use std::time::Instant;

use eframe::egui;
use tracing::{debug, info};
use uuid::Uuid;

use vidsnap_capture::{CaptureEvent, CaptureOptions, CaptureWorker, FfprobeCli};
use vidsnap_core::config::AppConfig;
use vidsnap_core::{PlaybackController, VideoLibrary, VideoSurfaceBinder};
use vidsnap_media::{FfmpegPlayer, FrameSurface};

// ── SurfaceBinder ─────────────────────────────────────────────────────────────

/// egui target: every load binds the player to the same shared frame slot.
pub struct SurfaceBinder {
    surface: FrameSurface,
}

impl VideoSurfaceBinder for SurfaceBinder {
    type Surface = FrameSurface;

    fn surface(&self) -> FrameSurface {
        self.surface.clone()
    }
}

// ── AppContext ────────────────────────────────────────────────────────────────

pub struct AppContext {
    pub config:     AppConfig,
    pub library:    VideoLibrary,
    pub controller: PlaybackController<FfmpegPlayer>,
    pub surface:    FrameSurface,
    pub capture:    CaptureWorker,
    /// Submission order; the newest is what the Cancel button targets.
    pub captures:   Vec<Uuid>,
    last_poll:      Option<Instant>,
}

impl AppContext {
    pub fn new(egui_ctx: &egui::Context, config: AppConfig) -> Self {
        // Decode-thread publishes wake the UI without a busy repaint loop.
        let repaint = egui_ctx.clone();
        let surface = FrameSurface::with_notify(move || repaint.request_repaint());

        let binder     = SurfaceBinder { surface: surface.clone() };
        let controller = PlaybackController::new(FfmpegPlayer::new(), Box::new(binder), &config);
        let capture    = CaptureWorker::new(Box::new(FfprobeCli::default()), CaptureOptions::default());

        Self {
            config,
            library: VideoLibrary::new(),
            controller,
            surface,
            capture,
            captures: Vec::new(),
            last_poll: None,
        }
    }

    /// Runs the position poll if the interval has elapsed. Returns true when
    /// it ran.
    pub fn poll_if_due(&mut self, now: Instant) -> bool {
        let due = self.last_poll
            .map(|t| now.saturating_duration_since(t) >= self.config.poll_interval())
            .unwrap_or(true);
        if due {
            self.controller.poll(now);
            self.last_poll = Some(now);
        }
        due
    }

    /// Everything the capture worker reported since the last frame.
    pub fn drain_capture_events(&mut self) -> Vec<CaptureEvent> {
        let events: Vec<CaptureEvent> = self.capture.rx.try_iter().collect();
        for ev in &events {
            let id = ev.job_id();
            self.captures.retain(|j| *j != id);
            debug!("[capture] event for {id}");
        }
        events
    }

    pub fn newest_capture(&self) -> Option<Uuid> {
        self.captures.last().copied()
    }

    pub fn shutdown(&mut self) {
        // Blocks until the running capture reaches its next cancel checkpoint.
        for ev in self.capture.shutdown() {
            debug!("[capture] {} settled during shutdown", ev.job_id());
        }
        self.captures.clear();
        self.controller.close();
        info!("[app] shut down");
    }
}
