use eframe::egui;
use shared::domain::HexColor;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x2E, 0x8B, 0x57);
pub const SURFACE: egui::Color32 = egui::Color32::from_rgb(0xF4, 0xF8, 0xF4);
pub const CARD_TEXT: egui::Color32 = egui::Color32::WHITE;
pub const MUTED_TEXT: egui::Color32 = egui::Color32::from_rgb(0x55, 0x5F, 0x55);
pub const ERROR_FILL: egui::Color32 = egui::Color32::from_rgb(0xFD, 0xEC, 0xEA);

pub fn to_color32(color: HexColor) -> egui::Color32 {
    let (r, g, b) = color.rgb();
    egui::Color32::from_rgb(r, g, b)
}

pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::light();
    visuals.panel_fill = SURFACE;
    visuals.hyperlink_color = ACCENT;
    visuals.selection.bg_fill = ACCENT;
    ctx.set_visuals(visuals);
}
