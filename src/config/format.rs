//! Human-readable rendering of a resolved configuration.
//!
//! Both functions are pure: the home directory used for `~` contraction is
//! passed in, and nothing touches the filesystem.

use std::path::Path;

use super::types::{Configuration, DomainAccess, FilterMode};
use crate::paths::contract_home;

const LABEL_WIDTH: usize = 23;

/// Render the active configuration.
///
/// Layout: header, one line per domain, defaults, then the config file and
/// profiles directory paths.
pub fn format_show(
    config: &Configuration,
    config_path: &Path,
    profiles_dir: &Path,
    active_profile: Option<&str>,
    home: Option<&Path>,
) -> String {
    let mut lines = Vec::new();

    match active_profile {
        Some(name) => lines.push(format!("pimgate configuration (profile: {name})")),
        None => lines.push("pimgate configuration (base)".to_owned()),
    }
    lines.push(String::new());

    lines.push(row("Calendars", &domain_summary(&config.calendars)));
    lines.push(row("Reminders", &domain_summary(&config.reminders)));
    lines.push(row("Contacts", &domain_summary(&config.contacts)));
    let mail = if config.mail.enabled { "enabled" } else { "disabled" };
    lines.push(row("Mail", mail));
    lines.push(String::new());

    lines.push(row(
        "Default calendar",
        config.effective_default_calendar().unwrap_or("(not set)"),
    ));
    lines.push(row(
        "Default reminder list",
        config
            .effective_default_reminder_list()
            .unwrap_or("(not set)"),
    ));
    lines.push(String::new());

    lines.push(row("Config file", &contract_home(config_path, home)));
    lines.push(row("Profiles", &contract_home(profiles_dir, home)));

    lines.join("\n")
}

/// Render the outcome of initializing a new configuration.
pub fn format_init(
    config_path: &Path,
    profiles_dir: &Path,
    calendars: &[String],
    reminder_lists: &[String],
    default_calendar: Option<&str>,
    default_reminder_list: Option<&str>,
    home: Option<&Path>,
) -> String {
    let mut lines = vec!["Initialized pimgate configuration".to_owned(), String::new()];

    push_discovered(&mut lines, "calendars", calendars);
    push_discovered(&mut lines, "reminder lists", reminder_lists);

    lines.push(row("Default calendar", default_calendar.unwrap_or("(not set)")));
    lines.push(row(
        "Default reminder list",
        default_reminder_list.unwrap_or("(not set)"),
    ));
    lines.push(String::new());

    lines.push(row("Config file", &contract_home(config_path, home)));
    lines.push(row("Profiles", &contract_home(profiles_dir, home)));

    lines.join("\n")
}

fn domain_summary(access: &DomainAccess) -> String {
    if !access.enabled {
        return "disabled".to_owned();
    }
    match access.mode {
        FilterMode::All => FilterMode::All.to_string(),
        mode if access.items.is_empty() => format!("{mode} (none)"),
        mode => format!("{mode} ({})", access.items.join(", ")),
    }
}

fn push_discovered(lines: &mut Vec<String>, label: &str, names: &[String]) {
    lines.push(format!("Discovered {label} ({}):", names.len()));
    if names.is_empty() {
        lines.push("  (none)".to_owned());
    } else {
        lines.extend(names.iter().map(|name| format!("  - {name}")));
    }
    lines.push(String::new());
}

fn row(label: &str, value: &str) -> String {
    format!("{:<width$}{value}", format!("{label}:"), width = LABEL_WIDTH + 1)
}
