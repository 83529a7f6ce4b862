use anyhow::{Context, Result};
use home::home_dir;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

use crate::types::AppInfo;

// Core/business logic: discovering desktop entries, parsing them into
// AppInfo records, filtering by search text, and launching applications.

/// Return the application directories to scan, user entries first so they
/// shadow system ones of the same id (XDG precedence).
pub fn candidate_app_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        if !data_home.is_empty() {
            dirs.push(PathBuf::from(data_home).join("applications"));
        }
    }
    if let Some(h) = home_dir() {
        dirs.push(h.join(".local").join("share").join("applications"));
    }

    let data_dirs = std::env::var("XDG_DATA_DIRS")
        .unwrap_or_else(|_| "/usr/local/share:/usr/share".to_string());
    for d in data_dirs.split(':').filter(|d| !d.is_empty()) {
        dirs.push(PathBuf::from(d).join("applications"));
    }

    let mut seen = HashSet::new();
    dirs.retain(|d| seen.insert(d.clone()));
    dirs
}

/// Parse one `.desktop` file. Returns `Ok(None)` for entries that are not
/// launchable applications (wrong type, hidden, or missing Name/Exec).
pub fn read_desktop_entry(path: &Path) -> Result<Option<AppInfo>> {
    let data = std::fs::read_to_string(path).with_context(|| format!("Read {path:?}"))?;

    let mut in_entry_section = false;
    let mut name: Option<String> = None;
    let mut exec: Option<String> = None;
    let mut icon: Option<String> = None;
    let mut entry_type: Option<String> = None;
    let mut hidden = false;

    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_entry_section = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry_section {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        match key {
            // First occurrence wins; localized variants (Name[xx]) skipped.
            "Name" if name.is_none() => name = Some(value.to_string()),
            "Exec" if exec.is_none() => exec = Some(value.to_string()),
            "Icon" if icon.is_none() => icon = Some(value.to_string()),
            "Type" if entry_type.is_none() => entry_type = Some(value.to_string()),
            "NoDisplay" | "Hidden" if value.eq_ignore_ascii_case("true") => hidden = true,
            _ => {}
        }
    }

    if hidden || entry_type.as_deref() != Some("Application") {
        return Ok(None);
    }
    let (Some(label), Some(exec)) = (name, exec) else {
        return Ok(None);
    };
    let app_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    // Only literal paths are honored; themed icon names are skipped.
    let icon = icon
        .map(PathBuf::from)
        .filter(|p| p.is_absolute() && p.exists());

    Ok(Some(AppInfo {
        label,
        app_id,
        exec: strip_field_codes(&exec),
        icon,
        desktop_file: path.to_path_buf(),
    }))
}

/// Remove `%f`-style field codes from an Exec line (`%%` is a literal `%`).
pub fn strip_field_codes(exec: &str) -> String {
    let mut out = String::with_capacity(exec.len());
    let mut chars = exec.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.next() {
                Some('%') => out.push('%'),
                Some(_) | None => {}
            }
        } else {
            out.push(c);
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scan a directory tree for `.desktop` files. Unparseable files are logged
/// and skipped; they never fail the whole scan.
pub fn scan_apps_in_dir(dir: &Path) -> Vec<AppInfo> {
    let mut res = Vec::new();
    for entry in WalkDir::new(dir).max_depth(2).into_iter().flatten() {
        let p = entry.path();
        if p.extension().and_then(|s| s.to_str()) != Some("desktop") {
            continue;
        }
        match read_desktop_entry(p) {
            Ok(Some(app)) => res.push(app),
            Ok(None) => {}
            Err(e) => log::debug!("catalog: skipping {p:?} ({e:#})"),
        }
    }
    res
}

/// Load the full catalog: every launchable entry across the candidate
/// directories, deduplicated by id (first directory wins) and sorted by
/// label. An empty list is a valid result.
pub fn load_catalog_from(dirs: &[PathBuf]) -> Vec<AppInfo> {
    let mut seen = HashSet::new();
    let mut res = Vec::new();
    for d in dirs {
        if !d.is_dir() {
            continue;
        }
        for app in scan_apps_in_dir(d) {
            if seen.insert(app.app_id.clone()) {
                res.push(app);
            }
        }
    }
    res.sort_by(|a, b| a.label.cmp(&b.label));
    res
}

pub fn load_catalog() -> Vec<AppInfo> {
    load_catalog_from(&candidate_app_dirs())
}

/// Case-insensitive substring filter on the label. An empty query returns
/// the whole catalog in its original order.
pub fn filter_apps(apps: &[AppInfo], query: &str) -> Vec<AppInfo> {
    if query.is_empty() {
        return apps.to_vec();
    }
    let q = query.to_lowercase();
    apps.iter()
        .filter(|a| a.label.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

/// Split a stripped Exec line into program + arguments, honoring the
/// desktop-entry double-quote convention.
fn split_command_line(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    for c in exec.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !cur.is_empty() {
                    args.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        args.push(cur);
    }
    args
}

/// Launch the application, detached. A failure (uninstalled binary, broken
/// entry) is absorbed; the tap simply does nothing.
pub fn launch(app: &AppInfo) {
    let argv = split_command_line(&app.exec);
    let Some((prog, rest)) = argv.split_first() else {
        log::debug!("launch: empty Exec for {}", app.app_id);
        return;
    };
    if let Err(e) = Command::new(prog).args(rest).spawn() {
        log::debug!("launch: {} failed ({e})", app.app_id);
    }
}

/// Best-effort jump to the entry's location via the system opener, the
/// closest desktop analog of an "application details" page.
pub fn open_app_settings(app: &AppInfo) {
    let target = app
        .desktop_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| app.desktop_file.clone());
    if let Err(e) = Command::new("xdg-open").arg(&target).spawn() {
        log::debug!("open_app_settings: {} failed ({e})", app.app_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_entry(dir: &Path, file: &str, body: &str) -> PathBuf {
        let p = dir.join(file);
        fs::write(&p, body).unwrap();
        p
    }

    fn app(label: &str, id: &str) -> AppInfo {
        AppInfo {
            label: label.to_string(),
            app_id: id.to_string(),
            exec: String::new(),
            icon: None,
            desktop_file: PathBuf::from(format!("{id}.desktop")),
        }
    }

    #[test]
    fn parses_a_minimal_application_entry() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_entry(
            dir.path(),
            "firefox.desktop",
            "[Desktop Entry]\nType=Application\nName=Firefox\nExec=firefox %u\n",
        );
        let app = read_desktop_entry(&p).unwrap().unwrap();
        assert_eq!(app.label, "Firefox");
        assert_eq!(app.app_id, "firefox");
        assert_eq!(app.exec, "firefox");
        assert_eq!(app.icon, None);
    }

    #[test]
    fn hidden_and_non_application_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let hidden = write_entry(
            dir.path(),
            "hidden.desktop",
            "[Desktop Entry]\nType=Application\nName=Hidden\nExec=x\nNoDisplay=true\n",
        );
        let link = write_entry(
            dir.path(),
            "link.desktop",
            "[Desktop Entry]\nType=Link\nName=A Link\nURL=https://example.org\n",
        );
        assert!(read_desktop_entry(&hidden).unwrap().is_none());
        assert!(read_desktop_entry(&link).unwrap().is_none());
    }

    #[test]
    fn keys_outside_the_entry_section_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let p = write_entry(
            dir.path(),
            "term.desktop",
            "[Desktop Entry]\nType=Application\nName=Terminal\nExec=term\n\
             [Desktop Action new-window]\nName=New Window\nExec=term --new\n",
        );
        let app = read_desktop_entry(&p).unwrap().unwrap();
        assert_eq!(app.label, "Terminal");
        assert_eq!(app.exec, "term");
    }

    #[test]
    fn field_codes_are_stripped_and_percent_escapes_kept() {
        assert_eq!(strip_field_codes("firefox %u"), "firefox");
        assert_eq!(strip_field_codes("app %F --flag %i"), "app --flag");
        assert_eq!(strip_field_codes("app --pct %%"), "app --pct %");
        assert_eq!(strip_field_codes("plain"), "plain");
    }

    #[test]
    fn command_line_split_honors_quotes() {
        assert_eq!(
            split_command_line("\"/opt/My App/bin\" --flag x"),
            vec!["/opt/My App/bin", "--flag", "x"]
        );
        assert_eq!(split_command_line("prog a b"), vec!["prog", "a", "b"]);
    }

    #[test]
    fn catalog_is_sorted_by_label_and_sort_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_entry(
            dir.path(),
            "zoom.desktop",
            "[Desktop Entry]\nType=Application\nName=Zoom\nExec=zoom\n",
        );
        write_entry(
            dir.path(),
            "alpha.desktop",
            "[Desktop Entry]\nType=Application\nName=Alpha\nExec=alpha\n",
        );
        let dirs = vec![dir.path().to_path_buf()];
        let apps = load_catalog_from(&dirs);
        let labels: Vec<_> = apps.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Zoom"]);

        let mut again = apps.clone();
        again.sort_by(|a, b| a.label.cmp(&b.label));
        assert_eq!(again, apps);
    }

    #[test]
    fn first_directory_wins_for_duplicate_ids() {
        let user = tempfile::tempdir().unwrap();
        let system = tempfile::tempdir().unwrap();
        write_entry(
            user.path(),
            "editor.desktop",
            "[Desktop Entry]\nType=Application\nName=Editor (user)\nExec=editor\n",
        );
        write_entry(
            system.path(),
            "editor.desktop",
            "[Desktop Entry]\nType=Application\nName=Editor (system)\nExec=editor\n",
        );
        let apps =
            load_catalog_from(&[user.path().to_path_buf(), system.path().to_path_buf()]);
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].label, "Editor (user)");
    }

    #[test]
    fn empty_directory_yields_an_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_catalog_from(&[dir.path().to_path_buf()]).is_empty());
    }

    #[test]
    fn filter_is_case_insensitive_substring_containment() {
        let apps = vec![app("Zoom", "zoom"), app("Alpha", "alpha")];
        let hit: Vec<_> = filter_apps(&apps, "al")
            .into_iter()
            .map(|a| a.label)
            .collect();
        assert_eq!(hit, vec!["Alpha"]);
        let upper: Vec<_> = filter_apps(&apps, "ZO")
            .into_iter()
            .map(|a| a.label)
            .collect();
        assert_eq!(upper, vec!["Zoom"]);
        assert!(filter_apps(&apps, "xyz").is_empty());
    }

    #[test]
    fn empty_query_is_identity_with_order_preserved() {
        let apps = vec![app("Zoom", "zoom"), app("Alpha", "alpha")];
        assert_eq!(filter_apps(&apps, ""), apps);
    }
}
