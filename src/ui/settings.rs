//! Settings screen: background color, background image, and icon/text color.

use std::sync::Arc;

use eframe::egui;
use egui::{Color32, RichText, Vec2};

use crate::prefs::{PrefStore, ThemeSnapshot};
use crate::theme::{
    color32_from_argb, color_display_name, contrasting_text_color, BACKGROUND_PALETTE,
    TEXT_PALETTE,
};
use crate::types::Screen;

use super::home::paint_background;

/// State local to the settings screen; the theme itself lives in the store.
#[derive(Default)]
pub struct SettingsView {
    image_uri_input: String,
}

impl SettingsView {
    /// Render the settings screen. All writes go through the store; the
    /// visible theme comes back through this screen's own subscription.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        store: &Arc<PrefStore>,
        theme: &ThemeSnapshot,
    ) -> Option<Screen> {
        let mut nav = None;
        let text_color = color32_from_argb(theme.text_icon_color);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                paint_background(ui, ui.max_rect(), theme);

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    ui.add_space(8.0);
                    if ui
                        .button(RichText::new("←").size(18.0).color(text_color))
                        .clicked()
                    {
                        nav = Some(Screen::Home);
                    }
                    ui.label(RichText::new("Settings").strong().size(20.0).color(text_color));
                });
                ui.add_space(8.0);

                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        ui.add_space(16.0);
                        ui.vertical(|ui| {
                            self.background_section(ui, store, text_color);
                            self.image_section(ui, store, text_color);
                            self.text_color_section(ui, store, text_color);
                            ui.add_space(16.0);
                        });
                    });
                });
            });

        nav
    }

    fn background_section(&self, ui: &mut egui::Ui, store: &Arc<PrefStore>, text_color: Color32) {
        section_header(ui, "Background color", text_color);
        swatch_grid(ui, "bg_swatches", &BACKGROUND_PALETTE, |argb| {
            store.save_background_color(argb);
        });
    }

    fn image_section(&mut self, ui: &mut egui::Ui, store: &Arc<PrefStore>, text_color: Color32) {
        section_header(ui, "Background image", text_color);
        ui.horizontal(|ui| {
            let edit = egui::TextEdit::singleline(&mut self.image_uri_input)
                .hint_text("Path or file:// uri")
                .text_color(text_color)
                .desired_width(260.0);
            ui.add(edit);
            if ui.button("Use image").clicked() {
                let uri = self.image_uri_input.trim();
                // empty entry is the cancelled-picker case: nothing changes
                if !uri.is_empty() {
                    store.save_background_image_uri(uri);
                    store.clear_background_color();
                    self.image_uri_input.clear();
                }
            }
        });
        if ui.button("Remove background image").clicked() {
            store.clear_background_image_uri();
        }
    }

    fn text_color_section(&self, ui: &mut egui::Ui, store: &Arc<PrefStore>, text_color: Color32) {
        section_header(ui, "Icon & text color", text_color);
        swatch_grid(ui, "text_swatches", &TEXT_PALETTE, |argb| {
            store.save_text_icon_color(argb);
        });
    }
}

fn section_header(ui: &mut egui::Ui, title: &str, text_color: Color32) {
    ui.add_space(14.0);
    ui.label(RichText::new(title).strong().size(16.0).color(text_color));
    ui.add_space(4.0);
}

/// Two-column grid of named color swatches; each label keeps its own
/// contrast color so it stays legible on the swatch.
fn swatch_grid(ui: &mut egui::Ui, id: &str, palette: &[u32], mut on_pick: impl FnMut(u32)) {
    egui::Grid::new(id).num_columns(2).spacing([8.0, 8.0]).show(ui, |ui| {
        for (i, &argb) in palette.iter().enumerate() {
            let label = RichText::new(color_display_name(argb))
                .color(contrasting_text_color(argb));
            let swatch = egui::Button::new(label)
                .fill(color32_from_argb(argb))
                .min_size(Vec2::new(150.0, 36.0));
            if ui.add(swatch).clicked() {
                on_pick(argb);
            }
            if i % 2 == 1 {
                ui.end_row();
            }
        }
    });
}
