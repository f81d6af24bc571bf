// crates/vidsnap-ui/src/modules/preview.rs
//
// The video canvas. Pulls the newest frame from the player's FrameSurface once
// per UI frame and keeps it as a single GPU texture. Frames arrive at native
// resolution; the canvas letterboxes them into whatever space the panel has.

use super::{PanelModule, PanelState};
use crate::theme::{ACCENT, BORDER, TEXT_DIM};
use egui::{Color32, ColorImage, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Ui, Vec2};
use vidsnap_core::commands::PlayerCommand;
use vidsnap_core::ControlState;
use vidsnap_media::FrameSurface;

pub struct PreviewModule {
    surface: FrameSurface,
    texture: Option<TextureHandle>,
    /// Surface generation last uploaded.
    seen:    u64,
}

impl PreviewModule {
    pub fn new(surface: FrameSurface) -> Self {
        Self { surface, texture: None, seen: 0 }
    }

    fn upload(&mut self, ctx: &egui::Context) {
        let Some((generation, frame)) = self.surface.latest_since(self.seen) else { return };
        self.seen = generation;

        let Some(frame) = frame else {
            self.texture = None;
            return;
        };
        let size = [frame.width as usize, frame.height as usize];
        if frame.data.len() != size[0] * size[1] * 4 {
            tracing::warn!("[preview] dropping frame with {} bytes for {}x{}", frame.data.len(), size[0], size[1]);
            return;
        }
        let image = ColorImage::from_rgba_unmultiplied(size, &frame.data);
        match &mut self.texture {
            Some(tex) => tex.set(image, TextureOptions::LINEAR),
            None      => self.texture = Some(ctx.load_texture("preview_frame", image, TextureOptions::LINEAR)),
        }
    }
}

/// Largest rect of `aspect` (w/h) centred in `outer`.
pub fn letterbox(outer: Rect, aspect: f32) -> Rect {
    if !(aspect.is_finite() && aspect > 0.0) || outer.height() <= 0.0 {
        return outer;
    }
    let (w, h) = if outer.width() / outer.height() > aspect {
        (outer.height() * aspect, outer.height())
    } else {
        (outer.width(), outer.width() / aspect)
    };
    Rect::from_center_size(outer.center(), Vec2::new(w, h))
}

impl PanelModule for PreviewModule {
    fn name(&self) -> &str { "Preview" }

    fn ui(&mut self, ui: &mut Ui, state: &PanelState<'_>, _cmd: &mut Vec<PlayerCommand>) {
        self.upload(ui.ctx());

        let (outer, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
        let painter    = ui.painter_at(outer);
        painter.rect_filled(outer, 3.0, Color32::BLACK);

        let Some(tex) = &self.texture else {
            let hint = match state.control {
                ControlState::Idle => "Choose a video from the list",
                _                  => "Loading…",
            };
            painter.text(outer.center(), egui::Align2::CENTER_CENTER, hint,
                egui::FontId::proportional(14.0), TEXT_DIM);
            return;
        };

        let [w, h] = tex.size();
        let rect   = letterbox(outer.shrink(2.0), w as f32 / h.max(1) as f32);
        painter.image(tex.id(), rect, Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)), Color32::WHITE);

        let stroke = if state.control == ControlState::Playing {
            Stroke::new(1.5, ACCENT.gamma_multiply(0.6))
        } else {
            Stroke::new(1.0, BORDER)
        };
        painter.rect_stroke(rect.expand(1.0), 2, stroke, egui::StrokeKind::Outside);

        // Source name badge, bottom-left of the picture.
        if let Some(entry) = &state.session.current_entry {
            let at = Pos2::new(rect.min.x + 6.0, rect.max.y - 20.0);
            let galley = painter.layout_no_wrap(
                entry.display_name.clone(), egui::FontId::proportional(11.0), Color32::from_gray(210));
            painter.rect_filled(
                Rect::from_min_size(at - egui::vec2(4.0, 2.0), galley.size() + egui::vec2(8.0, 4.0)),
                2.0, Color32::from_black_alpha(160));
            painter.galley(at, galley, Color32::from_gray(210));
        }

        if !state.captures.is_empty() {
            let at = Pos2::new(rect.max.x - 8.0, rect.min.y + 8.0);
            painter.text(at, egui::Align2::RIGHT_TOP,
                format!("saving {}…", state.captures.len()),
                egui::FontId::monospace(10.0), ACCENT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: f32, h: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(w, h))
    }

    #[test]
    fn wide_video_in_tall_panel_fills_width() {
        let r = letterbox(rect(400.0, 400.0), 16.0 / 9.0);
        assert_eq!(r.width(), 400.0);
        assert!((r.height() - 225.0).abs() < 0.01);
        assert_eq!(r.center(), Pos2::new(200.0, 200.0));
    }

    #[test]
    fn tall_video_in_wide_panel_fills_height() {
        let r = letterbox(rect(1000.0, 500.0), 9.0 / 16.0);
        assert_eq!(r.height(), 500.0);
        assert!((r.width() - 281.25).abs() < 0.01);
    }

    #[test]
    fn degenerate_aspect_uses_whole_rect() {
        assert_eq!(letterbox(rect(10.0, 10.0), 0.0), rect(10.0, 10.0));
        assert_eq!(letterbox(rect(10.0, 10.0), f32::NAN), rect(10.0, 10.0));
    }
}
