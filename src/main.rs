mod catalog;
mod prefs;
mod style;
mod theme;
mod types;
mod ui;

use std::sync::Arc;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 800.0])
            .with_min_inner_size([360.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "App Launcher",
        native_options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            let store = Arc::new(prefs::PrefStore::open_default()?);
            Ok(Box::new(ui::LauncherApp::new(store)))
        }),
    )
}
