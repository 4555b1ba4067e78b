//! pimgate: per-agent access control for local calendars, reminders,
//! contacts, and mail.
//!
//! An automation agent reaches the user's personal data through native
//! helpers; this crate decides which of that data a given agent instance may
//! see. For each operation:
//!
//! 1. [`config::resolve()`] picks the config directory and active profile from
//!    call parameters, workspace convention, host settings, and environment.
//! 2. [`config::load_resolved`] reads `config.json`, applies the named profile
//!    with whole-section replacement, and fails closed on a missing profile.
//! 3. Callers check [`config::Configuration::is_enabled`] and then
//!    [`config::is_allowed`] (or [`config::filter()`]) for every item before
//!    exposing it.
//!
//! Nothing is cached between calls and no global state is mutated, so a
//! single process can serve several isolated agents concurrently.

pub mod config;
pub mod error;
pub mod paths;

pub use config::{
    Configuration, Domain, DomainAccess, FilterMode, LoadedConfiguration, ProfileOverride,
};
pub use error::{ConfigError, Result};
