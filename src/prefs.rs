//! Persisted key-value preferences with synchronous change notification.
//!
//! The store is a small JSON file loaded once at startup and written through
//! on every mutation. Both screens share one handle; each subscribes while
//! visible and unsubscribes when it goes away, so a torn-down screen never
//! sees a late callback.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const PREFS_NAMESPACE: &str = "LauncherPrefs";
pub const KEY_BACKGROUND_COLOR: &str = "backgroundColor";
pub const KEY_BACKGROUND_IMAGE_URI: &str = "backgroundImageUri";
pub const KEY_TEXT_ICON_COLOR: &str = "textIconColor";

pub const DEFAULT_BACKGROUND_COLOR: u32 = crate::theme::WHITE;
pub const DEFAULT_TEXT_ICON_COLOR: u32 = crate::theme::BLACK;

/// On-disk shape. Absent keys fall back to hardcoded defaults on read.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PrefValues {
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    background_color: Option<u32>,
    #[serde(rename = "backgroundImageUri", skip_serializing_if = "Option::is_none")]
    background_image_uri: Option<String>,
    #[serde(rename = "textIconColor", skip_serializing_if = "Option::is_none")]
    text_icon_color: Option<u32>,
}

/// Handle returned by [`PrefStore::subscribe`]; pass back to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&str) + Send + Sync>;

/// One eager read of all three keys, used by a screen on activation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemeSnapshot {
    pub background_color: u32,
    pub background_image_uri: Option<String>,
    pub text_icon_color: u32,
}

pub struct PrefStore {
    path: PathBuf,
    values: Mutex<PrefValues>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl PrefStore {
    /// Open the store at the default per-user config location.
    pub fn open_default() -> Result<Self> {
        let dir = home::home_dir()
            .context("No home directory")?
            .join(".config")
            .join("app_launcher");
        Ok(Self::open(dir.join(format!("{PREFS_NAMESPACE}.json"))))
    }

    /// Open the store backed by an explicit file. A missing or unreadable
    /// file starts from defaults.
    pub fn open(path: PathBuf) -> Self {
        let values = match Self::load(&path) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("prefs: starting from defaults ({e:#})");
                PrefValues::default()
            }
        };
        Self {
            path,
            values: Mutex::new(values),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn load(path: &Path) -> Result<PrefValues> {
        if !path.exists() {
            return Ok(PrefValues::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("Read {path:?}"))?;
        serde_json::from_str(&data).with_context(|| format!("Parse {path:?}"))
    }

    /// Write-through. Persist failures keep the in-memory state and log.
    fn persist(&self, values: &PrefValues) {
        let res: Result<()> = (|| {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent).with_context(|| format!("Create {parent:?}"))?;
            }
            let data = serde_json::to_string_pretty(values)?;
            fs::write(&self.path, data).with_context(|| format!("Write {:?}", self.path))?;
            Ok(())
        })();
        if let Err(e) = res {
            log::warn!("prefs: persist failed ({e:#})");
        }
    }

    /// Invoke every registered listener for each changed key, in write order.
    /// Called after the value lock is released so listeners may read back.
    fn notify(&self, keys: &[&str]) {
        let listeners = self.listeners.lock().unwrap();
        for &key in keys {
            for (_, listener) in listeners.iter() {
                listener(key);
            }
        }
    }

    // === Reads (with defaults) ===

    pub fn background_color(&self) -> u32 {
        self.values
            .lock()
            .unwrap()
            .background_color
            .unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }

    pub fn background_image_uri(&self) -> Option<String> {
        self.values.lock().unwrap().background_image_uri.clone()
    }

    pub fn text_icon_color(&self) -> u32 {
        self.values
            .lock()
            .unwrap()
            .text_icon_color
            .unwrap_or(DEFAULT_TEXT_ICON_COLOR)
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        let v = self.values.lock().unwrap();
        ThemeSnapshot {
            background_color: v.background_color.unwrap_or(DEFAULT_BACKGROUND_COLOR),
            background_image_uri: v.background_image_uri.clone(),
            text_icon_color: v.text_icon_color.unwrap_or(DEFAULT_TEXT_ICON_COLOR),
        }
    }

    // === Writes ===

    /// Select a solid background color. Also removes any stored image uri so
    /// the color becomes the active background.
    pub fn save_background_color(&self, argb: u32) {
        {
            let mut v = self.values.lock().unwrap();
            v.background_color = Some(argb);
            v.background_image_uri = None;
            self.persist(&v);
        }
        self.notify(&[KEY_BACKGROUND_COLOR, KEY_BACKGROUND_IMAGE_URI]);
    }

    /// Store a background image uri. Leaves the color key alone; the image
    /// takes precedence whenever present. Image selection in the settings
    /// screen pairs this with [`clear_background_color`](Self::clear_background_color).
    pub fn save_background_image_uri(&self, uri: &str) {
        {
            let mut v = self.values.lock().unwrap();
            v.background_image_uri = Some(uri.to_string());
            self.persist(&v);
        }
        self.notify(&[KEY_BACKGROUND_IMAGE_URI]);
    }

    /// Remove the stored color key; reads fall back to the default.
    pub fn clear_background_color(&self) {
        {
            let mut v = self.values.lock().unwrap();
            v.background_color = None;
            self.persist(&v);
        }
        self.notify(&[KEY_BACKGROUND_COLOR]);
    }

    /// Remove the background image; rendering falls back to the color key
    /// (or its default when that was cleared too).
    pub fn clear_background_image_uri(&self) {
        {
            let mut v = self.values.lock().unwrap();
            v.background_image_uri = None;
            self.persist(&v);
        }
        self.notify(&[KEY_BACKGROUND_IMAGE_URI]);
    }

    pub fn save_text_icon_color(&self, argb: u32) {
        {
            let mut v = self.values.lock().unwrap();
            v.text_icon_color = Some(argb);
            self.persist(&v);
        }
        self.notify(&[KEY_TEXT_ICON_COLOR]);
    }

    // === Change subscription ===

    /// Register a listener invoked synchronously, once per mutated key, with
    /// the key name. Lives until [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe(&self, listener: impl Fn(&str) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().unwrap().push((id, Box::new(listener)));
        SubscriptionId(id)
    }

    /// Drop a listener. Writes after this call never reach it.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().unwrap().retain(|(lid, _)| *lid != id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;
    use std::sync::Arc;

    fn store_in(dir: &tempfile::TempDir) -> PrefStore {
        PrefStore::open(dir.path().join(format!("{PREFS_NAMESPACE}.json")))
    }

    #[test]
    fn unset_keys_read_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.background_color(), theme::WHITE);
        assert_eq!(store.text_icon_color(), theme::BLACK);
        assert_eq!(store.background_image_uri(), None);
    }

    #[test]
    fn saving_a_color_removes_the_image_uri() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_background_image_uri("file:///tmp/bg.png");
        store.save_background_color(theme::CYAN);
        assert_eq!(store.background_color(), theme::CYAN);
        assert_eq!(store.background_image_uri(), None);
    }

    #[test]
    fn saving_an_image_leaves_the_color_key_but_wins_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_background_color(theme::CYAN);
        store.save_background_image_uri("content://x");
        assert_eq!(store.background_image_uri(), Some("content://x".into()));
        // The color key is untouched, yet the image takes precedence.
        assert_eq!(store.background_color(), theme::CYAN);
        let snap = store.snapshot();
        assert_eq!(
            theme::resolve_background(snap.background_color, snap.background_image_uri.as_deref()),
            theme::Background::Image("content://x".into())
        );
    }

    #[test]
    fn image_selection_clears_the_active_color() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_background_color(theme::CYAN);
        // the image-selection action on the settings screen
        store.save_background_image_uri("file:///tmp/bg.png");
        store.clear_background_color();
        assert_eq!(store.background_color(), theme::WHITE);
        assert_eq!(store.background_image_uri(), Some("file:///tmp/bg.png".into()));
    }

    #[test]
    fn clearing_the_image_falls_back_to_solid() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save_background_color(theme::YELLOW);
        store.save_background_image_uri("file:///tmp/bg.png");
        store.clear_background_image_uri();
        // falls back to the last-set color
        let snap = store.snapshot();
        assert_eq!(
            theme::resolve_background(snap.background_color, snap.background_image_uri.as_deref()),
            theme::Background::Solid(theme::YELLOW)
        );
    }

    #[test]
    fn values_survive_reopening_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LauncherPrefs.json");
        {
            let store = PrefStore::open(path.clone());
            store.save_background_color(theme::MAGENTA);
            store.save_text_icon_color(theme::RED);
        }
        let store = PrefStore::open(path);
        assert_eq!(store.background_color(), theme::MAGENTA);
        assert_eq!(store.text_icon_color(), theme::RED);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LauncherPrefs.json");
        fs::write(&path, "not json").unwrap();
        let store = PrefStore::open(path);
        assert_eq!(store.background_color(), theme::WHITE);
    }

    #[test]
    fn listeners_see_each_mutated_key_in_write_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        store.subscribe(move |key| sink.lock().unwrap().push(key.to_string()));

        store.save_background_color(theme::CYAN);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![KEY_BACKGROUND_COLOR.to_string(), KEY_BACKGROUND_IMAGE_URI.to_string()]
        );

        seen.lock().unwrap().clear();
        store.save_text_icon_color(theme::BLUE);
        assert_eq!(*seen.lock().unwrap(), vec![KEY_TEXT_ICON_COLOR.to_string()]);
    }

    #[test]
    fn listeners_may_read_the_store_reentrantly() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));
        let observed = Arc::new(Mutex::new(0u32));
        let (st, obs) = (store.clone(), observed.clone());
        store.subscribe(move |key| {
            if key == KEY_BACKGROUND_COLOR {
                *obs.lock().unwrap() = st.background_color();
            }
        });
        store.save_background_color(theme::CYAN);
        assert_eq!(*observed.lock().unwrap(), theme::CYAN);
    }

    #[test]
    fn unsubscribed_listener_receives_no_late_callback() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        let id = store.subscribe(move |key| sink.lock().unwrap().push(key.to_string()));

        store.save_text_icon_color(theme::GRAY);
        assert_eq!(seen.lock().unwrap().len(), 1);

        store.unsubscribe(id);
        store.save_text_icon_color(theme::RED);
        store.save_background_color(theme::CYAN);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn independent_subscriptions_detach_independently() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let a = Arc::new(Mutex::new(0usize));
        let b = Arc::new(Mutex::new(0usize));
        let (sa, sb) = (a.clone(), b.clone());
        let id_a = store.subscribe(move |_| *sa.lock().unwrap() += 1);
        store.subscribe(move |_| *sb.lock().unwrap() += 1);

        store.save_text_icon_color(theme::BLUE);
        store.unsubscribe(id_a);
        store.save_text_icon_color(theme::GRAY);

        assert_eq!(*a.lock().unwrap(), 1);
        assert_eq!(*b.lock().unwrap(), 2);
    }
}
