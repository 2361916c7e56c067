//! Error types for exporter-config.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for exporter-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which lookup axis a resolution request used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// Resolution by monitored target identifier.
    Target,
    /// Resolution by administrative group identifier.
    Group,
}

impl LookupKind {
    /// Lowercase name, also used as a metric attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{}': {source}", .path.display())]
    IoError {
        /// Path that was being read
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The file contents are not a valid configuration document.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// No credentials match the requested target or group.
    #[error("No credentials found for {kind} '{key}'")]
    NotFound {
        /// Lookup axis that missed
        kind: LookupKind,
        /// The identifier that was looked up
        key: String,
    },

    /// File watching failed to initialize or register a path.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// Attempted to use a feature that is not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(&'static str),
}

impl ConfigError {
    pub(crate) fn not_found(kind: LookupKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Returns `true` if this error is a failed target or group lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
