//! The parsed configuration document and its credential blocks.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// Credentials and collector list for a single target or group.
///
/// An empty `collectors` list means "unset": resolution substitutes the
/// document's global collector list.
///
/// The `Debug` output never includes the password.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Login name, may be empty.
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    /// Login secret, may be empty.
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    /// Collectors to run, in order.
    #[serde(deserialize_with = "null_as_default")]
    pub collectors: Vec<String>,
}

impl HostConfig {
    /// Create a credential block with no collector override.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            collectors: Vec::new(),
        }
    }

    /// Set this block's own collector list.
    pub fn with_collectors<I, S>(mut self, collectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collectors = collectors.into_iter().map(Into::into).collect();
        self
    }

    /// Copy of this block with its collectors resolved against `defaults`.
    pub(crate) fn resolved(&self, defaults: &[String]) -> HostConfig {
        let collectors = if self.collectors.is_empty() {
            defaults.to_vec()
        } else {
            self.collectors.clone()
        };

        HostConfig {
            username: self.username.clone(),
            password: self.password.clone(),
            collectors,
        }
    }
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("collectors", &self.collectors)
            .finish()
    }
}

/// One fully parsed configuration file.
///
/// Documents are never modified after they are handed to a
/// [`ConfigStore`](crate::core::ConfigStore); a reload publishes a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    /// Credentials keyed by target identifier. The key `"default"` is the
    /// catch-all for targets without their own entry.
    #[serde(deserialize_with = "null_as_default")]
    pub hosts: HashMap<String, HostConfig>,
    /// Credentials keyed by group identifier.
    #[serde(deserialize_with = "null_as_default")]
    pub groups: HashMap<String, HostConfig>,
    /// Global default collector list.
    #[serde(deserialize_with = "null_as_default")]
    pub collectors: Vec<String>,
    /// Application log level, empty when unset.
    #[serde(rename = "loglevel", alias = "log_level", deserialize_with = "null_as_default")]
    pub log_level: String,
}

impl ConfigDocument {
    /// Add or replace a target entry.
    pub fn with_host(mut self, target: impl Into<String>, host: HostConfig) -> Self {
        self.hosts.insert(target.into(), host);
        self
    }

    /// Add or replace a group entry.
    pub fn with_group(mut self, group: impl Into<String>, host: HostConfig) -> Self {
        self.groups.insert(group.into(), host);
        self
    }

    /// Set the global collector list.
    pub fn with_collectors<I, S>(mut self, collectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collectors = collectors.into_iter().map(Into::into).collect();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

/// Explicit `null` decodes to the type's empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
