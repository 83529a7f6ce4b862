//! Egui-based UI for the launcher.
//!
//! This module defines the application state, the eframe App implementation,
//! the per-screen preference binding, and wires UI actions to the background
//! catalog load in ui::tasks.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use eframe::{egui, App};

use crate::prefs::{
    PrefStore, SubscriptionId, ThemeSnapshot, KEY_BACKGROUND_COLOR, KEY_BACKGROUND_IMAGE_URI,
    KEY_TEXT_ICON_COLOR,
};
use crate::style::set_base_style;
use crate::types::{AppInfo, CatalogUpdate, Screen};

pub mod home;
pub mod settings;
pub mod tasks;

/// Shared UI state synchronized between the UI thread and the catalog load.
pub struct GuiState {
    pub apps: Vec<AppInfo>,
    pub catalog_loaded: bool,
    pub search_text: String,

    // one-shot catalog channel
    pub catalog_tx: mpsc::Sender<CatalogUpdate>,
    pub catalog_rx: mpsc::Receiver<CatalogUpdate>,
}

impl GuiState {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            apps: Vec::new(),
            catalog_loaded: false,
            search_text: String::new(),
            catalog_tx: tx,
            catalog_rx: rx,
        }
    }
}

/// A screen's live mirror of the preference store.
///
/// `activate` performs one eager read of all three keys and registers a
/// change listener; `deactivate` removes it. While inactive the snapshot is
/// frozen and no callbacks arrive, so a hidden screen is never written to.
pub struct ThemeBinding {
    store: Arc<PrefStore>,
    state: Arc<Mutex<ThemeSnapshot>>,
    subscription: Option<SubscriptionId>,
}

impl ThemeBinding {
    pub fn new(store: Arc<PrefStore>) -> Self {
        let state = Arc::new(Mutex::new(store.snapshot()));
        Self {
            store,
            state,
            subscription: None,
        }
    }

    pub fn activate(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        *self.state.lock().unwrap() = self.store.snapshot();
        let state = self.state.clone();
        let store = Arc::downgrade(&self.store);
        self.subscription = Some(self.store.subscribe(move |key| {
            let Some(store) = store.upgrade() else { return };
            let mut s = state.lock().unwrap();
            match key {
                KEY_BACKGROUND_COLOR => s.background_color = store.background_color(),
                KEY_BACKGROUND_IMAGE_URI => s.background_image_uri = store.background_image_uri(),
                KEY_TEXT_ICON_COLOR => s.text_icon_color = store.text_icon_color(),
                _ => {}
            }
        }));
    }

    pub fn deactivate(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.store.unsubscribe(id);
        }
    }

    pub fn current(&self) -> ThemeSnapshot {
        self.state.lock().unwrap().clone()
    }
}

impl Drop for ThemeBinding {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Main eframe application: two screens over one shared preference store.
pub struct LauncherApp {
    pub state: Arc<Mutex<GuiState>>,
    pub store: Arc<PrefStore>,
    screen: Screen,
    home_theme: ThemeBinding,
    settings_theme: ThemeBinding,
    settings_view: settings::SettingsView,
}

impl LauncherApp {
    /// Start on the home screen and immediately kick off the catalog load.
    pub fn new(store: Arc<PrefStore>) -> Self {
        let state = Arc::new(Mutex::new(GuiState::new()));
        tasks::spawn_refresh_apps(state.clone());

        let mut home_theme = ThemeBinding::new(store.clone());
        home_theme.activate();
        let settings_theme = ThemeBinding::new(store.clone());

        Self {
            state,
            store,
            screen: Screen::Home,
            home_theme,
            settings_theme,
            settings_view: settings::SettingsView::default(),
        }
    }

    /// Swap screens: the outgoing binding unsubscribes before the incoming
    /// one eagerly re-reads and subscribes.
    fn navigate(&mut self, to: Screen) {
        if to == self.screen {
            return;
        }
        match self.screen {
            Screen::Home => self.home_theme.deactivate(),
            Screen::Settings => self.settings_theme.deactivate(),
        }
        match to {
            Screen::Home => self.home_theme.activate(),
            Screen::Settings => self.settings_theme.activate(),
        }
        self.screen = to;
    }
}

impl App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        set_base_style(ctx);

        // pull the catalog result if it arrived (non-blocking)
        {
            let mut s = self.state.lock().unwrap();
            while let Ok(update) = s.catalog_rx.try_recv() {
                log::info!("catalog: loaded {} applications", update.apps.len());
                s.apps = update.apps;
                s.catalog_loaded = true;
            }
        }

        let nav = match self.screen {
            Screen::Home => home::show(ctx, &self.state, &self.home_theme.current()),
            Screen::Settings => self.settings_view.show(
                ctx,
                &self.store,
                &self.settings_theme.current(),
            ),
        };
        if let Some(to) = nav {
            self.navigate(to);
        }

        // keep polling until the one-shot load lands
        if !self.state.lock().unwrap().catalog_loaded {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
