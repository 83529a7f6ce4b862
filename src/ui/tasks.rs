//! Background task used by the UI to load the application catalog without
//! blocking rendering.

use std::sync::{Arc, Mutex};
use std::thread;

use crate::catalog::load_catalog;
use crate::types::CatalogUpdate;

use super::GuiState;

/// Spawn the one-shot catalog load. The UI keeps rendering its empty state
/// and picks the result up from the channel on a later frame.
pub fn spawn_refresh_apps(state_arc: Arc<Mutex<GuiState>>) {
    let tx = {
        let s = state_arc.lock().unwrap();
        s.catalog_tx.clone()
    };
    thread::spawn(move || {
        let apps = load_catalog();
        // receiver gone means the app shut down first; nothing to deliver
        let _ = tx.send(CatalogUpdate { apps });
    });
}
