//! Configuration resolution and access control.
//!
//! # Architecture
//!
//! - **types** — `Configuration`, `ProfileOverride`, `DomainAccess`, `FilterMode`
//! - **filter** — pure allow/deny evaluation of a single item
//! - **resolve** — picks the config directory and profile for a call
//! - **loader** — reads `config.json` and `profiles/<name>.json`, merges them
//! - **persist** — atomic, key-sorted JSON writes and first-run `init`
//! - **format** — human-readable rendering
//!
//! # Quick Start
//!
//! ```
//! use pimgate::config::{Configuration, DomainAccess, is_allowed};
//!
//! let config = Configuration {
//!     calendars: DomainAccess::blocklist(["Holidays"]),
//!     ..Configuration::default()
//! };
//! assert!(!is_allowed("Holidays", None, &config.calendars));
//! assert!(config.allows_calendar("✈️ Travel", None));
//! ```

pub mod filter;
pub mod format;
pub mod loader;
pub mod persist;
pub mod resolve;
pub mod types;

pub use filter::{filter, is_allowed, match_key, strip_decorative_prefix};
pub use format::{format_init, format_show};
pub use loader::{
    BaseSource, LoadedConfiguration, list_profiles, load_base, load_for, load_profile,
    load_resolved, merge, profile_path, validate_profile_name,
};
pub use persist::{InitReport, init_config, to_sorted_json, write_config, write_profile};
pub use resolve::{
    CONFIG_DIR_ENV, Environment, MapEnv, PROFILE_ENV, ProcessEnv, Resolution, SourceKind,
    SourceOverrides, resolve,
};
pub use types::{
    Configuration, Domain, DomainAccess, FilterMode, FilterModeParseError, MailAccess,
    ProfileOverride,
};
