//! Where `slingshot-stats` keeps its settings, and `~` handling for
//! user-supplied paths.

use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "slingshot-stats";
const SETTINGS_FILE: &str = "settings.json";

/// `$XDG_CONFIG_HOME/slingshot-stats`, falling back to `~/.config/slingshot-stats`.
pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(env::var_os("XDG_CONFIG_HOME").map(PathBuf::from), home())
}

/// Default location of the rollup settings file.
pub fn default_settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SETTINGS_FILE))
}

fn config_dir_from(xdg: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    // XDG requires an absolute path; anything else is ignored
    let base = match xdg.filter(|p| p.is_absolute()) {
        Some(xdg) => xdg,
        None => home?.join(".config"),
    };
    Some(base.join(APP_DIR))
}

/// Expand `~` and `~/...`. Other paths, and `~user` forms, are returned as-is.
pub fn expand_path(path: &str) -> PathBuf {
    expand_with(path, home().as_deref())
}

fn expand_with(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    match path.strip_prefix('~') {
        Some("") => home.to_path_buf(),
        Some(rest) if rest.starts_with('/') => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

fn home() -> Option<PathBuf> {
    env::var_os("HOME").filter(|h| !h.is_empty()).map(PathBuf::from)
}
