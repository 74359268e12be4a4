use eframe::{
    egui::{Context, Visuals},
    epaint::Color32,
};

use super::render::Tone;

pub const ACCENT: Color32 = Color32::from_rgb(56, 189, 248);
pub const POSITIVE: Color32 = Color32::from_rgb(34, 197, 94);
pub const NEGATIVE: Color32 = Color32::from_rgb(239, 68, 68);
pub const SECONDARY: Color32 = Color32::from_rgb(148, 163, 184);
pub const CARD: Color32 = Color32::from_rgb(30, 41, 59);
pub const BACKGROUND: Color32 = Color32::from_rgb(15, 23, 42);

pub fn tone_color(tone: Tone) -> Color32 {
    match tone {
        Tone::Positive => POSITIVE,
        Tone::Negative => NEGATIVE,
    }
}

pub fn configure_style(ctx: &Context) {
    let mut visuals = Visuals::dark();
    visuals.panel_fill = BACKGROUND;
    visuals.window_fill = CARD;
    visuals.extreme_bg_color = BACKGROUND;
    visuals.hyperlink_color = ACCENT;
    ctx.set_visuals(visuals);
}
