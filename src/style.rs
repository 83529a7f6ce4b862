//! Base egui style applied before the user's theme colors.

use eframe::egui;

/// Neutral light style; the persisted preferences supply the actual
/// background and text colors on top of this.
pub fn set_base_style(ctx: &egui::Context) {
    use egui::Visuals;

    let mut visuals = Visuals::light();
    visuals.panel_fill = egui::Color32::TRANSPARENT;
    visuals.widgets.hovered.bg_fill = egui::Color32::from_rgba_unmultiplied(255, 255, 255, 40);
    visuals.widgets.active.bg_fill = egui::Color32::from_rgba_unmultiplied(255, 255, 255, 80);
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    ctx.set_style(style);
}
