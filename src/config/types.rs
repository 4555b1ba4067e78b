//! Access-control configuration types.
//!
//! [`Configuration`] is the authoritative base record stored in
//! `config.json`. [`ProfileOverride`] is the partial record stored in
//! `profiles/<name>.json`: every field is optional, and a present field
//! replaces the base's corresponding section wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::filter::is_allowed;

/// A governed category of personal data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Calendar events.
    Calendars,
    /// Reminder lists and their items.
    Reminders,
    /// Address book contacts.
    Contacts,
    /// Mail. Access-only: there is no per-item filter.
    Mail,
}

impl Domain {
    /// Return all domains in display order.
    pub fn all() -> &'static [Domain] {
        &[
            Domain::Calendars,
            Domain::Reminders,
            Domain::Contacts,
            Domain::Mail,
        ]
    }

    /// Whether the domain carries an allow/block item filter.
    pub fn is_filterable(self) -> bool {
        !matches!(self, Domain::Mail)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Domain::Calendars => "calendars",
            Domain::Reminders => "reminders",
            Domain::Contacts => "contacts",
            Domain::Mail => "mail",
        };
        f.write_str(s)
    }
}

/// Policy applied to a domain's items.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Every item is visible; `items` is ignored.
    #[default]
    All,
    /// Only listed items are visible. An empty list allows nothing.
    Allowlist,
    /// Every item except the listed ones is visible.
    Blocklist,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterMode::All => "all",
            FilterMode::Allowlist => "allowlist",
            FilterMode::Blocklist => "blocklist",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing an unknown filter mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter mode: {0:?} (expected all, allowlist, or blocklist)")]
pub struct FilterModeParseError(pub String);

impl FromStr for FilterMode {
    type Err = FilterModeParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "allowlist" => Ok(FilterMode::Allowlist),
            "blocklist" => Ok(FilterMode::Blocklist),
            _ => Err(FilterModeParseError(s.to_owned())),
        }
    }
}

/// Access settings for one filterable domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainAccess {
    /// When false the domain is hidden from the agent regardless of `mode`.
    pub enabled: bool,
    /// Filter policy.
    pub mode: FilterMode,
    /// Display names or stable identifiers the policy applies to.
    pub items: Vec<String>,
    /// Calendar or list used when an operation does not name one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_target: Option<String>,
}

impl Default for DomainAccess {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: FilterMode::All,
            items: Vec::new(),
            default_target: None,
        }
    }
}

impl DomainAccess {
    /// Enabled, every item visible.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Enabled, only `items` visible.
    pub fn allowlist<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Allowlist,
            items: items.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Enabled, everything except `items` visible.
    pub fn blocklist<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mode: FilterMode::Blocklist,
            items: items.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Hidden entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the default calendar / list name.
    #[must_use]
    pub fn with_default_target(mut self, target: impl Into<String>) -> Self {
        self.default_target = Some(target.into());
        self
    }

    /// `enabled` check followed by the item filter.
    pub fn permits(&self, name: &str, id: Option<&str>) -> bool {
        self.enabled && is_allowed(name, id, self)
    }
}

/// Access settings for mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailAccess {
    /// When false mail capabilities are hidden from the agent.
    pub enabled: bool,
}

impl Default for MailAccess {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// The base configuration read from `config.json`.
///
/// A missing file is equivalent to [`Configuration::default`]: every domain
/// enabled with no filtering. Restriction is always an explicit opt-out.
///
/// The same type represents the result of merging a profile on top of the
/// base, since a merged value has no optional sections left.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Calendar access.
    pub calendars: DomainAccess,
    /// Reminder list access.
    pub reminders: DomainAccess,
    /// Contacts access.
    pub contacts: DomainAccess,
    /// Mail access.
    pub mail: MailAccess,
    /// Flat copy of the default calendar, kept for older readers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_calendar: Option<String>,
    /// Flat copy of the default reminder list, kept for older readers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_reminder_list: Option<String>,
}

impl Configuration {
    /// Filter section for `domain`, or `None` for mail.
    pub fn access(&self, domain: Domain) -> Option<&DomainAccess> {
        match domain {
            Domain::Calendars => Some(&self.calendars),
            Domain::Reminders => Some(&self.reminders),
            Domain::Contacts => Some(&self.contacts),
            Domain::Mail => None,
        }
    }

    /// Whether the domain's capabilities should be exposed at all.
    pub fn is_enabled(&self, domain: Domain) -> bool {
        match self.access(domain) {
            Some(access) => access.enabled,
            None => self.mail.enabled,
        }
    }

    /// Whether an item in `domain` is visible. For mail only `enabled` applies.
    pub fn allows(&self, domain: Domain, name: &str, id: Option<&str>) -> bool {
        match self.access(domain) {
            Some(access) => access.permits(name, id),
            None => self.mail.enabled,
        }
    }

    /// Whether a calendar is visible.
    pub fn allows_calendar(&self, name: &str, id: Option<&str>) -> bool {
        self.allows(Domain::Calendars, name, id)
    }

    /// Whether a reminder list is visible.
    pub fn allows_reminder_list(&self, name: &str, id: Option<&str>) -> bool {
        self.allows(Domain::Reminders, name, id)
    }

    /// Whether a contact is visible.
    pub fn allows_contact(&self, name: &str, id: Option<&str>) -> bool {
        self.allows(Domain::Contacts, name, id)
    }

    /// Default calendar: the section's `default_target`, then the flat field.
    pub fn effective_default_calendar(&self) -> Option<&str> {
        self.calendars
            .default_target
            .as_deref()
            .or(self.default_calendar.as_deref())
    }

    /// Default reminder list: the section's `default_target`, then the flat field.
    pub fn effective_default_reminder_list(&self) -> Option<&str> {
        self.reminders
            .default_target
            .as_deref()
            .or(self.default_reminder_list.as_deref())
    }
}

/// A named partial override layered over the base configuration.
///
/// `None` means "inherit from base". `Some` replaces the base's section or
/// field entirely; sibling fields inside a present section are never taken
/// from the base. Absent keys in the JSON file deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    /// Replacement calendar section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendars: Option<DomainAccess>,
    /// Replacement reminders section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<DomainAccess>,
    /// Replacement contacts section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<DomainAccess>,
    /// Replacement mail section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailAccess>,
    /// Replacement flat default calendar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_calendar: Option<String>,
    /// Replacement flat default reminder list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_reminder_list: Option<String>,
}

impl ProfileOverride {
    /// True when no field is set, i.e. merging is the identity.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
