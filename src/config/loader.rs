//! Loading and merging of base configuration and named profiles.
//!
//! Files are read whole on every call; nothing is cached, so edits take
//! effect on the next operation. A missing `config.json` yields the
//! permissive defaults. Every other failure propagates as a
//! [`ConfigError`] and is never replaced by defaults.

use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};

use super::resolve::Resolution;
use super::types::{Configuration, DomainAccess, ProfileOverride};
use crate::error::{ConfigError, Result};
use crate::paths;

/// Where the base section of a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSource {
    /// Read from `config.json`.
    File,
    /// No `config.json`; built-in permissive defaults were used.
    Defaults,
}

impl BaseSource {
    /// Informational line for display. Not an error in either case.
    pub fn describe(self, config_path: &Path) -> String {
        match self {
            BaseSource::File => format!("using configuration from {}", config_path.display()),
            BaseSource::Defaults => format!(
                "no configuration file at {}, using defaults (all domains enabled, no filtering)",
                config_path.display()
            ),
        }
    }
}

/// A fully resolved configuration plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfiguration {
    /// Base merged with the active profile.
    pub config: Configuration,
    /// Whether the base came from disk or from defaults.
    pub base_source: BaseSource,
    /// Name of the applied profile, if any.
    pub profile: Option<String>,
    /// `<config_dir>/config.json`.
    pub config_path: PathBuf,
    /// `<config_dir>/profiles/`.
    pub profiles_dir: PathBuf,
}

/// Read `<config_dir>/config.json`, or the permissive defaults if it is absent.
///
/// # Errors
/// [`ConfigError::Parse`] for malformed content, [`ConfigError::Io`] when the
/// file exists but cannot be read.
pub fn load_base(config_dir: &Path) -> Result<Configuration> {
    load_base_with_source(config_dir).map(|(config, _)| config)
}

fn load_base_with_source(config_dir: &Path) -> Result<(Configuration, BaseSource)> {
    let path = paths::config_file(config_dir);
    match read_json::<Configuration>(&path)? {
        Some(config) => {
            tracing::debug!(path = %path.display(), "loaded base configuration");
            Ok((config, BaseSource::File))
        }
        None => {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok((Configuration::default(), BaseSource::Defaults))
        }
    }
}

/// Read a named profile. Returns `Ok(None)` only when the file does not exist.
///
/// Callers that were explicitly asked for `name` must treat `None` as a hard
/// failure; [`load_resolved`] does so.
///
/// # Errors
/// [`ConfigError::InvalidProfileName`] before any I/O, then the same parse
/// and I/O errors as [`load_base`].
pub fn load_profile(config_dir: &Path, name: &str) -> Result<Option<ProfileOverride>> {
    validate_profile_name(name)?;
    read_json::<ProfileOverride>(&profile_path(config_dir, name))
}

/// Reject names that could escape the profiles directory or that name
/// hidden files.
///
/// # Errors
/// [`ConfigError::InvalidProfileName`] with the reason.
pub fn validate_profile_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.starts_with('.') {
        Some("must not start with '.'")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name.contains("..") {
        Some("must not contain '..'")
    } else if name.contains('\0') {
        Some("must not contain NUL")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidProfileName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Path of the profile file for `name`.
///
/// Only the final path segment of `name` is used, whether or not it passed
/// [`validate_profile_name`], so the result always sits directly inside
/// `<config_dir>/profiles/`.
#[must_use]
pub fn profile_path(config_dir: &Path, name: &str) -> PathBuf {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match last {
        "" | "." | ".." => "_invalid",
        other => other,
    };
    paths::profiles_dir(config_dir).join(format!("{stem}.{}", paths::PROFILE_EXTENSION))
}

/// Layer `profile` over `base` with whole-section replacement.
///
/// Each present section or flat default in the profile replaces the base's
/// value verbatim; absent ones keep the base's value. `merge(base, None)` and
/// `merge(base, Some(&ProfileOverride::default()))` both return `base`
/// unchanged.
///
/// A default target the profile sets in one place (flat field or section
/// `default_target`) is copied to the other unless the profile sets both,
/// so a base default can never shadow the profile's choice.
#[must_use]
pub fn merge(base: Configuration, profile: Option<&ProfileOverride>) -> Configuration {
    let Some(profile) = profile else {
        return base;
    };

    let mut merged = base;
    if let Some(calendars) = &profile.calendars {
        merged.calendars = calendars.clone();
    }
    if let Some(reminders) = &profile.reminders {
        merged.reminders = reminders.clone();
    }
    if let Some(contacts) = &profile.contacts {
        merged.contacts = contacts.clone();
    }
    if let Some(mail) = &profile.mail {
        merged.mail = mail.clone();
    }
    if let Some(default_calendar) = &profile.default_calendar {
        merged.default_calendar = Some(default_calendar.clone());
    }
    if let Some(default_reminder_list) = &profile.default_reminder_list {
        merged.default_reminder_list = Some(default_reminder_list.clone());
    }

    sync_default(
        profile.calendars.as_ref(),
        profile.default_calendar.as_ref(),
        &mut merged.calendars,
        &mut merged.default_calendar,
    );
    sync_default(
        profile.reminders.as_ref(),
        profile.default_reminder_list.as_ref(),
        &mut merged.reminders,
        &mut merged.default_reminder_list,
    );
    merged
}

fn sync_default(
    profile_section: Option<&DomainAccess>,
    profile_flat: Option<&String>,
    section: &mut DomainAccess,
    flat: &mut Option<String>,
) {
    let profile_target = profile_section.and_then(|s| s.default_target.as_ref());
    match (profile_target, profile_flat) {
        (None, Some(value)) => section.default_target = Some(value.clone()),
        (Some(value), None) => *flat = Some(value.clone()),
        _ => {}
    }
}

/// Load the base, apply the named profile if any, and return the result.
///
/// Order of checks: profile name validation (before any I/O), then the base
/// file, then the profile file. A base error is therefore reported even when
/// the profile is also broken or missing.
///
/// # Errors
/// Any error from [`validate_profile_name`], [`load_base`], or
/// [`load_profile`]; [`ConfigError::ProfileNotFound`] when `profile` is set
/// but has no file.
pub fn load_resolved(config_dir: &Path, profile: Option<&str>) -> Result<LoadedConfiguration> {
    if let Some(name) = profile {
        validate_profile_name(name)?;
    }

    let (base, base_source) = load_base_with_source(config_dir)?;

    let overlay = match profile {
        Some(name) => {
            let overlay =
                load_profile(config_dir, name)?.ok_or_else(|| ConfigError::ProfileNotFound {
                    name: name.to_owned(),
                    searched: paths::profiles_dir(config_dir),
                })?;
            tracing::info!(profile = name, "applying profile");
            Some(overlay)
        }
        None => None,
    };

    Ok(LoadedConfiguration {
        config: merge(base, overlay.as_ref()),
        base_source,
        profile: profile.map(str::to_owned),
        config_path: paths::config_file(config_dir),
        profiles_dir: paths::profiles_dir(config_dir),
    })
}

/// [`load_resolved`] for the output of [`super::resolve::resolve`].
///
/// # Errors
/// Same as [`load_resolved`].
pub fn load_for(resolution: &Resolution) -> Result<LoadedConfiguration> {
    load_resolved(&resolution.config_dir, resolution.profile.as_deref())
}

/// Names of the profiles present in `<config_dir>/profiles/`, sorted.
///
/// Files whose stem would fail [`validate_profile_name`] are skipped. A
/// missing profiles directory yields an empty list.
///
/// # Errors
/// [`ConfigError::Io`] if the directory exists but cannot be listed.
pub fn list_profiles(config_dir: &Path) -> Result<Vec<String>> {
    let dir = paths::profiles_dir(config_dir);
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(ConfigError::Io { path: dir, source }),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(paths::PROFILE_EXTENSION)
        {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            && validate_profile_name(stem).is_ok()
        {
            names.push(stem.to_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Read and decode a JSON file in one shot. `Ok(None)` when it does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
