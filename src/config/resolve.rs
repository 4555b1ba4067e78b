//! Source resolution: which config directory and profile apply to a call.
//!
//! Each value is resolved independently; the first present source wins:
//!
//! 1. explicit per-call parameter
//! 2. workspace convention `<workspace>/pimgate/config.json` (config dir only)
//! 3. host / plugin configured default
//! 4. environment (`PIMGATE_CONFIG_DIR`, `PIMGATE_PROFILE`)
//! 5. built-in default `~/.config/pimgate/`, no profile
//!
//! The environment is passed in through [`Environment`] and is only ever
//! read, so concurrent resolutions for different agents never interfere.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths;

/// Environment variable selecting the config directory.
pub const CONFIG_DIR_ENV: &str = "PIMGATE_CONFIG_DIR";

/// Environment variable selecting the active profile.
pub const PROFILE_ENV: &str = "PIMGATE_PROFILE";

/// Read-only view of the environment a resolution runs in.
pub trait Environment {
    /// Value of an environment variable, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// Home directory of the user being resolved for.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// An in-memory environment, for tests and for adapters that serve several
/// isolated agents from one process.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
}

impl MapEnv {
    /// Empty environment with no home directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the home directory.
    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}

/// Config dir / profile values supplied by a caller or by host settings.
///
/// Empty strings are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOverrides {
    /// Config directory; a leading `~` is expanded.
    pub config_dir: Option<String>,
    /// Profile name.
    pub profile: Option<String>,
}

impl SourceOverrides {
    /// No overrides.
    pub fn none() -> Self {
        Self::default()
    }

    /// Override the config directory.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<String>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Override the profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Explicit per-call parameter.
    CallParameter,
    /// `<workspace>/pimgate/config.json` exists.
    Workspace,
    /// Host / plugin-level setting.
    Host,
    /// Process environment variable.
    Environment,
    /// Built-in default.
    BuiltIn,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceKind::CallParameter => "call parameter",
            SourceKind::Workspace => "workspace",
            SourceKind::Host => "host setting",
            SourceKind::Environment => "environment",
            SourceKind::BuiltIn => "built-in default",
        };
        f.write_str(s)
    }
}

/// Output of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Directory holding `config.json` and `profiles/`.
    pub config_dir: PathBuf,
    /// Active profile name, if any. Not yet validated.
    pub profile: Option<String>,
    /// Which source supplied `config_dir`.
    pub config_dir_source: SourceKind,
    /// Which source supplied `profile`; `None` when no profile is active.
    pub profile_source: Option<SourceKind>,
}

/// Resolve the config directory and profile for one operation.
pub fn resolve(
    call: &SourceOverrides,
    workspace_dir: Option<&Path>,
    host: Option<&SourceOverrides>,
    env: &dyn Environment,
) -> Resolution {
    let home = env.home_dir();
    let home = home.as_deref();

    let (config_dir, config_dir_source) = if let Some(dir) = non_empty(&call.config_dir) {
        (paths::expand_tilde(dir, home), SourceKind::CallParameter)
    } else if let Some(dir) = workspace_dir.and_then(workspace_candidate) {
        (dir, SourceKind::Workspace)
    } else if let Some(dir) = host.and_then(|h| non_empty(&h.config_dir)) {
        (paths::expand_tilde(dir, home), SourceKind::Host)
    } else if let Some(dir) = env.var(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        (paths::expand_tilde(&dir, home), SourceKind::Environment)
    } else {
        (paths::default_config_dir(home), SourceKind::BuiltIn)
    };

    let (profile, profile_source) = if let Some(name) = non_empty(&call.profile) {
        (Some(name.to_owned()), Some(SourceKind::CallParameter))
    } else if let Some(name) = host.and_then(|h| non_empty(&h.profile)) {
        (Some(name.to_owned()), Some(SourceKind::Host))
    } else if let Some(name) = env.var(PROFILE_ENV).filter(|v| !v.is_empty()) {
        (Some(name), Some(SourceKind::Environment))
    } else {
        (None, None)
    };

    tracing::debug!(
        config_dir = %config_dir.display(),
        config_dir_source = %config_dir_source,
        profile = profile.as_deref().unwrap_or("-"),
        "resolved config sources"
    );

    Resolution {
        config_dir,
        profile,
        config_dir_source,
        profile_source,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn workspace_candidate(workspace: &Path) -> Option<PathBuf> {
    let dir = paths::workspace_config_dir(workspace);
    paths::config_file(&dir).is_file().then_some(dir)
}
