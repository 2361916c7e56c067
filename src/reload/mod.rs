//! Reload triggers that call [`ConfigStore::reload`](crate::core::ConfigStore::reload).
//!
//! The store never watches files itself. These helpers are the optional
//! callers: a periodic timer and, with `file-watch`, a debounced file watcher.
//! Both log the outcome of each reload and keep the current document when a
//! reload fails.

mod task;

#[cfg(feature = "file-watch")]
mod watcher;

pub use task::{ReloadTask, spawn_periodic_reload};

#[cfg(feature = "file-watch")]
pub use watcher::{ConfigWatcher, spawn_watch_reload};
