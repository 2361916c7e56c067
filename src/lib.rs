//! # exporter-config
//!
//! Hot-reloadable credential and collector configuration for metrics exporters.
//!
//! ## Overview
//!
//! An exporter scrapes many targets, each needing login credentials and a
//! list of collectors to run. `exporter-config` keeps that information in a
//! [`ConfigStore`](core::ConfigStore) which:
//! - Loads a YAML (or TOML/JSON) file of per-host and per-group credentials
//! - Swaps in a fully parsed new document on reload, lock-free for readers
//! - Keeps the previous document when a reload fails
//! - Resolves credentials per target (with a `"default"` catch-all) or per group
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exporter_config::prelude::*;
//!
//! # fn example() -> exporter_config::error::Result<()> {
//! // config.yml:
//! //   hosts:
//! //     default: { username: monitor, password: secret }
//! //   collectors: [system, thermal]
//! //   loglevel: debug
//! let store = ConfigStore::from_file("config.yml")?;
//!
//! let creds = store.host_config_for_target("10.0.0.7")?;
//! println!("scraping as {} with {:?}", creds.username, creds.collectors);
//!
//! // Later, from a signal handler or timer:
//! if let Err(e) = store.reload("config.yml") {
//!     eprintln!("reload failed, keeping previous config: {}", e);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Resolution Rules
//!
//! - **Targets**: exact `hosts` entry, else `hosts["default"]`, else `NotFound`
//! - **Groups**: exact `groups` entry, else `NotFound` (no default fallback)
//! - **Collectors**: the entry's own list, or the global list when empty
//! - **Log level**: `loglevel`, or `"info"` when unset
//!
//! ## Feature Flags
//!
//! - `yaml` (default), `toml`, `json`, `all-formats`: file formats
//! - `file-watch` (default): reload when the file changes
//! - `tokio-runtime`: periodic reload timer
//! - `metrics`: OpenTelemetry reload and lookup metrics

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;

#[cfg(feature = "tokio-runtime")]
pub mod reload;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigDocument, ConfigStore, ConfigStoreBuilder, HostConfig};
    pub use crate::error::{ConfigError, LookupKind, Result};
}
