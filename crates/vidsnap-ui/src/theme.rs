// crates/vidsnap-ui/src/theme.rs
use egui::{Color32, Context, Stroke, Style, Visuals};
use vidsnap_core::NoticeLevel;

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:       Color32 = Color32::from_rgb( 64, 196, 180);
pub const ACCENT_DIM:   Color32 = Color32::from_rgb( 30, 120, 110);
pub const ACCENT_HOVER: Color32 = Color32::from_rgb(110, 220, 205);

pub const BG_0:         Color32 = Color32::from_rgb( 12,  14,  16);
pub const BG_1:         Color32 = Color32::from_rgb( 19,  22,  25);
pub const BG_2:         Color32 = Color32::from_rgb( 27,  31,  35);
pub const BG_3:         Color32 = Color32::from_rgb( 37,  42,  47);
pub const BG_4:         Color32 = Color32::from_rgb( 49,  55,  61);

pub const TEXT:         Color32 = Color32::from_rgb(218, 224, 228);
pub const TEXT_DIM:     Color32 = Color32::from_rgb(118, 128, 136);
pub const BORDER:       Color32 = Color32::from_rgb( 52,  60,  66);

pub const NOTICE_INFO:  Color32 = Color32::from_rgb( 90, 170, 230);
pub const NOTICE_WARN:  Color32 = Color32::from_rgb(235, 180,  60);
pub const NOTICE_ERROR: Color32 = Color32::from_rgb(225,  80,  70);

pub fn notice_color(level: NoticeLevel) -> Color32 {
    match level {
        NoticeLevel::Info    => NOTICE_INFO,
        NoticeLevel::Warning => NOTICE_WARN,
        NoticeLevel::Error   => NOTICE_ERROR,
    }
}

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(6.0, 5.0);
    style.spacing.window_margin    = egui::Margin::same(12);
    style.spacing.button_padding   = egui::vec2(9.0, 4.0);
    style.spacing.scroll.bar_width = 8.0;

    let cr = egui::CornerRadius::same(3);

    let mut v = Visuals::dark();
    v.panel_fill       = BG_1;
    v.window_fill      = BG_2;
    v.faint_bg_color   = BG_0;
    v.extreme_bg_color = BG_0;
    v.window_stroke    = Stroke::new(1.0, BORDER);

    v.selection.bg_fill = ACCENT_DIM;
    v.selection.stroke  = Stroke::new(1.0, TEXT);
    v.hyperlink_color   = ACCENT_HOVER;

    let w = &mut v.widgets;
    w.noninteractive.bg_fill       = BG_2;
    w.noninteractive.bg_stroke     = Stroke::new(1.0, BORDER);
    w.noninteractive.fg_stroke     = Stroke::new(1.0, TEXT_DIM);
    w.noninteractive.corner_radius = cr;

    w.inactive.bg_fill             = BG_3;
    w.inactive.bg_stroke           = Stroke::new(1.0, BORDER);
    w.inactive.fg_stroke           = Stroke::new(1.0, TEXT);
    w.inactive.corner_radius       = cr;

    w.hovered.bg_fill              = BG_4;
    w.hovered.bg_stroke            = Stroke::new(1.0, ACCENT_DIM);
    w.hovered.fg_stroke            = Stroke::new(1.5, ACCENT_HOVER);
    w.hovered.corner_radius        = cr;

    w.active.bg_fill               = ACCENT_DIM;
    w.active.bg_stroke             = Stroke::new(1.0, ACCENT);
    w.active.fg_stroke             = Stroke::new(2.0, Color32::WHITE);
    w.active.corner_radius         = cr;

    v.override_text_color = Some(TEXT);
    v.window_corner_radius = cr;

    style.visuals = v;
    ctx.set_style(style);
}
