//! Filesystem layout for pimgate configuration.
//!
//! # Directory Layout
//!
//! | Purpose | Path |
//! |---------|------|
//! | Config dir (default) | `~/.config/pimgate/` |
//! | Base config | `<config dir>/config.json` |
//! | Profiles | `<config dir>/profiles/<name>.json` |
//! | Workspace convention | `<workspace>/pimgate/config.json` |
//!
//! Home-directory handling takes the home path as an argument rather than
//! reading it ambiently, so callers can resolve on behalf of another
//! environment (see [`crate::config::Environment`]).

use std::path::{Path, PathBuf};

/// Application directory name, used under `~/.config/` and inside workspaces.
pub const APP_NAME: &str = "pimgate";

/// Base configuration file name.
pub const CONFIG_FILE: &str = "config.json";

/// Profiles subdirectory name.
pub const PROFILES_DIR: &str = "profiles";

/// Profile file extension (without the dot).
pub const PROFILE_EXTENSION: &str = "json";

/// Base config file path (`<config_dir>/config.json`).
#[must_use]
pub fn config_file(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE)
}

/// Profiles directory path (`<config_dir>/profiles/`).
#[must_use]
pub fn profiles_dir(config_dir: &Path) -> PathBuf {
    config_dir.join(PROFILES_DIR)
}

/// Built-in config directory (`~/.config/pimgate/`).
///
/// Falls back to a fixed temp location when the home directory is unknown.
#[must_use]
pub fn default_config_dir(home: Option<&Path>) -> PathBuf {
    home.map(|h| h.join(".config").join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("/tmp/pimgate-config"))
}

/// Config directory under the workspace convention (`<workspace>/pimgate/`).
#[must_use]
pub fn workspace_config_dir(workspace: &Path) -> PathBuf {
    workspace.join(APP_NAME)
}

/// Expand a leading `~` or `~/` against `home`.
///
/// Other forms (`~user/...`, tildes elsewhere) are left untouched, as is
/// everything when `home` is unknown.
#[must_use]
pub fn expand_tilde(value: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(value);
    };
    if value == "~" {
        return home.to_path_buf();
    }
    match value.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(value),
    }
}

/// Render `path` for display with the home prefix contracted to `~`.
#[must_use]
pub fn contract_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && !home.as_os_str().is_empty()
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_owned();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
