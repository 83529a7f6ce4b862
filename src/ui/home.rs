//! Home screen: wallpaper, search field, and the app grid.

use std::sync::{Arc, Mutex};

use eframe::egui;
use egui::load::{SizeHint, TexturePoll};
use egui::{Align2, Color32, FontId, Rect, Sense, TextureOptions, Vec2};

use crate::catalog::{self, filter_apps};
use crate::prefs::ThemeSnapshot;
use crate::theme::{color32_from_argb, resolve_background, Background};
use crate::types::{AppInfo, Screen};

use super::GuiState;

const GRID_COLUMNS: usize = 4;
const CELL_HEIGHT: f32 = 96.0;
const ICON_SIDE: f32 = 48.0;

/// Render the home screen. Returns a navigation request when the user
/// long-presses (or right-clicks) the wallpaper or hits the gear button.
pub fn show(
    ctx: &egui::Context,
    state: &Arc<Mutex<GuiState>>,
    theme: &ThemeSnapshot,
) -> Option<Screen> {
    let mut nav = None;
    let text_color = color32_from_argb(theme.text_icon_color);

    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            paint_background(ui, ui.max_rect(), theme);

            // Wallpaper gesture surface, registered before any cell so every
            // cell wins the hit test over it.
            let wallpaper = ui.interact(
                ui.max_rect(),
                ui.id().with("wallpaper"),
                Sense::click(),
            );
            if wallpaper.long_touched() || wallpaper.secondary_clicked() {
                nav = Some(Screen::Settings);
            }

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.add_space(12.0);
                let mut s = state.lock().unwrap();
                let search = egui::TextEdit::singleline(&mut s.search_text)
                    .hint_text("Search apps")
                    .text_color(text_color)
                    .desired_width(ui.available_width() - 48.0);
                ui.add(search);
                drop(s);
                if ui
                    .button(egui::RichText::new("⚙").size(18.0).color(text_color))
                    .clicked()
                {
                    nav = Some(Screen::Settings);
                }
            });
            ui.add_space(8.0);

            let (filtered, query, loaded, total) = {
                let s = state.lock().unwrap();
                (
                    filter_apps(&s.apps, &s.search_text),
                    s.search_text.clone(),
                    s.catalog_loaded,
                    s.apps.len(),
                )
            };

            if loaded && total == 0 {
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.colored_label(text_color, "No applications found.");
                });
                return;
            }
            if filtered.is_empty() && !query.is_empty() {
                ui.add_space(16.0);
                ui.horizontal(|ui| {
                    ui.add_space(16.0);
                    ui.colored_label(
                        text_color,
                        format!("No applications match \"{query}\"."),
                    );
                });
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                let cell_width =
                    (ui.available_width() - 24.0) / GRID_COLUMNS as f32;
                for row in filtered.chunks(GRID_COLUMNS) {
                    ui.horizontal(|ui| {
                        ui.add_space(12.0);
                        for app in row {
                            let resp = app_cell(
                                ui,
                                app,
                                Vec2::new(cell_width, CELL_HEIGHT),
                                text_color,
                            );
                            // long press first so a release after holding
                            // does not double as a tap
                            if resp.long_touched() || resp.secondary_clicked() {
                                catalog::open_app_settings(app);
                            } else if resp.clicked() {
                                catalog::launch(app);
                            }
                        }
                    });
                }
                ui.add_space(12.0);
            });
        });

    nav
}

/// Fill `rect` with the configured wallpaper: the stored image when one is
/// set (scaled to cover, cropped to bounds), else the solid color.
pub fn paint_background(ui: &egui::Ui, rect: Rect, theme: &ThemeSnapshot) {
    let solid = color32_from_argb(theme.background_color);
    match resolve_background(theme.background_color, theme.background_image_uri.as_deref()) {
        Background::Solid(c) => {
            ui.painter().rect_filled(rect, 0.0, color32_from_argb(c));
        }
        Background::Image(uri) => {
            let uri = file_uri(&uri);
            match ui
                .ctx()
                .try_load_texture(&uri, TextureOptions::LINEAR, SizeHint::default())
            {
                Ok(TexturePoll::Ready { texture }) => {
                    let scale = (rect.width() / texture.size.x)
                        .max(rect.height() / texture.size.y);
                    let cover =
                        Rect::from_center_size(rect.center(), texture.size * scale);
                    ui.painter().with_clip_rect(rect).image(
                        texture.id,
                        cover,
                        Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                Ok(TexturePoll::Pending { .. }) => {
                    ui.painter().rect_filled(rect, 0.0, solid);
                    ui.ctx().request_repaint();
                }
                Err(e) => {
                    // unreadable image degrades to the solid color
                    log::trace!("wallpaper: {uri} not loadable ({e})");
                    ui.painter().rect_filled(rect, 0.0, solid);
                }
            }
        }
    }
}

/// Turn a stored image reference into a loader uri; plain paths get the
/// `file://` scheme, anything already carrying a scheme passes through.
pub fn file_uri(stored: &str) -> String {
    if stored.contains("://") {
        stored.to_string()
    } else {
        format!("file://{stored}")
    }
}

/// One interactive grid cell: icon above a truncated label, the whole
/// surface a single click/long-press target.
fn app_cell(ui: &mut egui::Ui, app: &AppInfo, size: Vec2, text_color: Color32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

    if ui.is_rect_visible(rect) {
        if response.hovered() {
            ui.painter()
                .rect_filled(rect, 8.0, ui.visuals().widgets.hovered.bg_fill);
        }

        let icon_center = egui::pos2(rect.center().x, rect.top() + 10.0 + ICON_SIDE / 2.0);
        let icon_rect = Rect::from_center_size(icon_center, Vec2::splat(ICON_SIDE));
        let mut icon_drawn = false;
        if let Some(path) = &app.icon {
            let uri = file_uri(&path.to_string_lossy());
            if let Ok(TexturePoll::Ready { texture }) = ui.ctx().try_load_texture(
                &uri,
                TextureOptions::LINEAR,
                SizeHint::default(),
            ) {
                ui.painter().image(
                    texture.id,
                    icon_rect,
                    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
                icon_drawn = true;
            }
        }
        if !icon_drawn {
            ui.painter().text(
                icon_center,
                Align2::CENTER_CENTER,
                "📦",
                FontId::proportional(30.0),
                text_color,
            );
        }

        ui.painter().text(
            egui::pos2(rect.center().x, rect.bottom() - 16.0),
            Align2::CENTER_CENTER,
            truncate_label(&app.label, 16),
            FontId::default(),
            text_color,
        );
    }

    response
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
