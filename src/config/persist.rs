//! Atomic config file writes.
//!
//! JSON is written pretty-printed with lexicographically sorted keys, via a
//! uniquely named temp file that is fsynced and renamed over the target, so
//! readers see either the old or the new complete file. A failed write
//! leaves no temp file behind.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::loader::validate_profile_name;
use super::types::{Configuration, DomainAccess, ProfileOverride};
use crate::error::{ConfigError, Result};
use crate::paths;

/// Encode `value` as pretty JSON with sorted keys and a trailing newline.
///
/// # Errors
/// [`ConfigError::Serialize`] if the value cannot be represented as JSON.
pub fn to_sorted_json<T: Serialize>(value: &T) -> Result<String> {
    // `serde_json::Value` objects are BTreeMap-backed, which sorts the keys.
    let value = serde_json::to_value(value).map_err(ConfigError::Serialize)?;
    let mut text = serde_json::to_string_pretty(&value).map_err(ConfigError::Serialize)?;
    text.push('\n');
    Ok(text)
}

/// Write `config` to `<config_dir>/config.json`, returning the path.
///
/// # Errors
/// [`ConfigError::Serialize`] or [`ConfigError::Io`].
pub fn write_config(config_dir: &Path, config: &Configuration) -> Result<PathBuf> {
    let path = paths::config_file(config_dir);
    write_text_atomic(&path, &to_sorted_json(config)?)?;
    tracing::info!(path = %path.display(), "wrote configuration");
    Ok(path)
}

/// Write `profile` to `<config_dir>/profiles/<name>.json`, returning the path.
///
/// # Errors
/// [`ConfigError::InvalidProfileName`], [`ConfigError::Serialize`], or
/// [`ConfigError::Io`].
pub fn write_profile(config_dir: &Path, name: &str, profile: &ProfileOverride) -> Result<PathBuf> {
    validate_profile_name(name)?;
    let path = super::loader::profile_path(config_dir, name);
    write_text_atomic(&path, &to_sorted_json(profile)?)?;
    tracing::info!(profile = name, path = %path.display(), "wrote profile");
    Ok(path)
}

/// Result of [`init_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// The configuration that was written.
    pub config: Configuration,
    /// Path of the new `config.json`.
    pub config_path: PathBuf,
    /// Profiles directory (created empty).
    pub profiles_dir: PathBuf,
}

/// Create a permissive starter configuration from discovered calendars and
/// reminder lists.
///
/// The first discovered calendar / list becomes the default target. An
/// existing `config.json` is never overwritten.
///
/// # Errors
/// [`ConfigError::AlreadyExists`] if the file is present, otherwise the
/// errors of [`write_config`].
pub fn init_config(
    config_dir: &Path,
    calendars: &[String],
    reminder_lists: &[String],
) -> Result<InitReport> {
    let config_path = paths::config_file(config_dir);
    if config_path.exists() {
        return Err(ConfigError::AlreadyExists { path: config_path });
    }

    let default_calendar = calendars.first().cloned();
    let default_reminder_list = reminder_lists.first().cloned();
    let config = Configuration {
        calendars: DomainAccess {
            default_target: default_calendar.clone(),
            ..DomainAccess::allow_all()
        },
        reminders: DomainAccess {
            default_target: default_reminder_list.clone(),
            ..DomainAccess::allow_all()
        },
        default_calendar,
        default_reminder_list,
        ..Configuration::default()
    };

    let profiles_dir = paths::profiles_dir(config_dir);
    std::fs::create_dir_all(&profiles_dir).map_err(|source| ConfigError::Io {
        path: profiles_dir.clone(),
        source,
    })?;
    write_text_new(&config_path, &to_sorted_json(&config)?)?;
    tracing::info!(path = %config_path.display(), "wrote starter configuration");

    Ok(InitReport {
        config,
        config_path,
        profiles_dir,
    })
}

fn write_text_atomic(path: &Path, text: &str) -> Result<()> {
    let temp = stage_temp(path, text)?;
    temp.persist(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Like [`write_text_atomic`] but fails with [`ConfigError::AlreadyExists`]
/// instead of replacing a file that appeared at `path`.
fn write_text_new(path: &Path, text: &str) -> Result<()> {
    let temp = stage_temp(path, text)?;
    temp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source: e.error,
            }
        }
    })?;
    Ok(())
}

/// Write `text` to a uniquely named temp file beside `path` and fsync it.
/// The temp file is removed when dropped unless persisted.
fn stage_temp(path: &Path, text: &str) -> Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: parent.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(parent).map_err(io_err)?;
    let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.as_file_mut()
        .write_all(text.as_bytes())
        .map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    Ok(temp)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::loader::{list_profiles, load_base, load_profile};
    use crate::config::types::MailAccess;

    #[test]
    fn sorted_json_orders_keys() {
        let config = Configuration {
            default_calendar: Some("Work".into()),
            ..Configuration::default()
        };
        let text = to_sorted_json(&config).expect("serialize");
        let order = ["\"calendars\"", "\"contacts\"", "\"default_calendar\"", "\"mail\"", "\"reminders\""];
        let positions: Vec<usize> = order
            .iter()
            .map(|key| text.find(key).expect("key present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
        assert!(text.ends_with("}\n"));
        // Nested keys are sorted as well.
        let enabled = text.find("\"enabled\"").expect("enabled");
        let items = text.find("\"items\"").expect("items");
        let mode = text.find("\"mode\"").expect("mode");
        assert!(enabled < items && items < mode);
    }

    #[test]
    fn write_then_load_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Configuration {
            calendars: DomainAccess::blocklist(["Holidays", "🎂 Birthdays"]),
            mail: MailAccess { enabled: false },
            ..Configuration::default()
        };
        let path = write_config(dir.path(), &config).expect("write");
        assert_eq!(path, dir.path().join("config.json"));
        assert!(!dir.path().join("config.json.tmp").exists());
        assert_eq!(load_base(dir.path()).expect("load"), config);
    }

    #[test]
    fn write_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a/b");
        write_config(&nested, &Configuration::default()).expect("write");
        assert!(nested.join("config.json").is_file());
    }

    #[test]
    fn write_then_load_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile = ProfileOverride {
            reminders: Some(DomainAccess::allowlist(["Errands"])),
            ..ProfileOverride::default()
        };
        write_profile(dir.path(), "errands", &profile).expect("write");
        assert_eq!(
            load_profile(dir.path(), "errands").expect("load"),
            Some(profile)
        );
        assert_eq!(list_profiles(dir.path()).expect("list"), vec!["errands".to_owned()]);
    }

    #[test]
    fn write_profile_rejects_invalid_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = write_profile(dir.path(), "../escape", &ProfileOverride::default())
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::InvalidProfileName { .. }));
        assert!(!dir.path().join("escape.json").exists());
    }

    #[test]
    fn init_uses_first_discovered_as_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let calendars = vec!["Work".to_owned(), "Home".to_owned()];
        let lists = vec!["Inbox".to_owned()];
        let report = init_config(dir.path(), &calendars, &lists).expect("init");

        assert_eq!(report.config.default_calendar.as_deref(), Some("Work"));
        assert_eq!(report.config.effective_default_calendar(), Some("Work"));
        assert_eq!(report.config.default_reminder_list.as_deref(), Some("Inbox"));
        assert!(report.profiles_dir.is_dir());
        assert_eq!(load_base(dir.path()).expect("load"), report.config);
    }

    #[test]
    fn init_with_nothing_discovered_has_no_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = init_config(dir.path(), &[], &[]).expect("init");
        assert_eq!(report.config, Configuration::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("config.json"), "{}").expect("write");
        let err = init_config(dir.path(), &[], &[]).expect_err("should fail");
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("config.json")).expect("read"),
            "{}"
        );
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn create_only_write_does_not_replace_a_file_that_appeared() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        // Stands in for another writer winning after the existence check.
        std::fs::write(&path, "{\"mail\": {\"enabled\": false}}").expect("write");

        let err = write_text_new(&path, "{}\n").expect_err("should fail");
        assert!(matches!(err, ConfigError::AlreadyExists { .. }), "{err}");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "{\"mail\": {\"enabled\": false}}"
        );
        assert_eq!(dir_entries(dir.path()), vec!["config.json".to_owned()]);
    }

    #[test]
    fn writes_leave_no_temp_files_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config(dir.path(), &Configuration::default()).expect("write");
        write_config(dir.path(), &Configuration::default()).expect("rewrite");
        assert_eq!(dir_entries(dir.path()), vec!["config.json".to_owned()]);
    }

    #[test]
    fn failed_write_removes_its_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory at the target makes the final rename fail.
        let target = dir.path().join("config.json");
        std::fs::create_dir_all(target.join("occupied")).expect("mkdir");

        let err = write_text_atomic(&target, "{}\n").expect_err("should fail");
        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
        assert_eq!(dir_entries(dir.path()), vec!["config.json".to_owned()]);
    }
}
