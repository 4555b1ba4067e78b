//! Error types for configuration resolution.
//!
//! Every variant carries enough context (path, profile name) to be shown to
//! the user as-is. A missing base `config.json` is not an error: the loader
//! reports it through [`crate::config::BaseSource::Defaults`] instead.

use std::path::PathBuf;

/// Errors raised while loading, validating, or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but is not valid JSON or does not match the schema.
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying JSON error (includes line/column).
        #[source]
        source: serde_json::Error,
    },

    /// The file exists but could not be read or written.
    #[error("failed to access config file '{}': {source}", path.display())]
    Io {
        /// File or directory involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A profile was requested by name but no profile file exists.
    #[error("profile '{name}' not found in '{}'", searched.display())]
    ProfileNotFound {
        /// Requested profile name.
        name: String,
        /// Profiles directory that was searched.
        searched: PathBuf,
    },

    /// The profile name could escape the profiles directory or is otherwise unusable.
    #[error("invalid profile name {name:?}: {reason}")]
    InvalidProfileName {
        /// Rejected name, verbatim.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// `init` refused to overwrite an existing configuration.
    #[error("config file '{}' already exists", path.display())]
    AlreadyExists {
        /// Existing file.
        path: PathBuf,
    },

    /// A configuration value could not be encoded as JSON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ConfigError>;
