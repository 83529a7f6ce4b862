//! Core data types shared across the application.

use std::path::PathBuf;

/// Launchable application discovered from a desktop entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppInfo {
    /// Display label (`Name=` of the desktop entry).
    pub label: String,
    /// Desktop-file id (file stem), unique within the catalog.
    pub app_id: String,
    /// Command line from `Exec=`, field codes already stripped.
    pub exec: String,
    /// Icon path when `Icon=` names a file on disk.
    pub icon: Option<PathBuf>,
    /// The entry this record was built from.
    pub desktop_file: PathBuf,
}

/// Result message sent from the background catalog load to the UI.
#[derive(Clone, Debug)]
pub struct CatalogUpdate {
    pub apps: Vec<AppInfo>,
}

/// Which screen the window is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    Settings,
}
