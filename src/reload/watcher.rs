//! File watching for automatic configuration reloads.

use super::task::{ReloadTask, reload_and_log};
use crate::core::ConfigStore;
use crate::error::{ConfigError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Watches configuration files and emits debounced reload signals.
///
/// Each file is watched through its parent directory, so a save that
/// replaces the file (write to a temp file, then rename) is still seen.
/// Events for other files in the same directory are ignored.
///
/// # Examples
///
/// ```rust,no_run
/// use exporter_config::reload::ConfigWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (watcher, mut rx) = ConfigWatcher::new(Duration::from_millis(500))?;
/// watcher.watch("/etc/exporter/config.yml")?;
///
/// while let Some(()) = rx.recv().await {
///     println!("config file changed, reload triggered");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcher {
    watcher: Mutex<RecommendedWatcher>,
    debounce_duration: Duration,
    /// Canonical parent directory joined with the file name
    watched_paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl ConfigWatcher {
    /// Create a new watcher.
    ///
    /// Returns the watcher and a receiver that yields one `()` per reload
    /// that should happen. Changes are coalesced until none has arrived for
    /// `debounce_duration`. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WatchError`] if the platform watcher cannot be
    /// created.
    pub fn new(debounce_duration: Duration) -> Result<(Self, mpsc::Receiver<()>)> {
        let (tx, rx) = mpsc::channel(100);
        let debounce = debounce_duration;
        let watched_paths: Arc<Mutex<Vec<PathBuf>>> = Arc::new(Mutex::new(Vec::new()));

        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        let filter_paths = Arc::clone(&watched_paths);
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }

            let watched = filter_paths.lock();
            if event.paths.iter().any(|p| watched.contains(p)) {
                let _ = event_tx.send(event);
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("Failed to create file watcher: {}", e)))?;

        // Trailing-edge debounce: a burst of events yields one signal, sent
        // once the file has been quiet for a full window.
        tokio::spawn(async move {
            while event_rx.recv().await.is_some() {
                loop {
                    match timeout(debounce, event_rx.recv()).await {
                        Ok(Some(_)) => continue,
                        Ok(None) => return,
                        Err(_) => break,
                    }
                }

                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });

        Ok((
            Self {
                watcher: Mutex::new(watcher),
                debounce_duration,
                watched_paths,
            },
            rx,
        ))
    }

    /// Start watching a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file does not exist and
    /// [`ConfigError::WatchError`] if its directory cannot be watched.
    pub fn watch(&self, path: impl AsRef<Path>) -> Result<()> {
        let (dir, key) = watch_key(path.as_ref())?;

        // The notify callback takes `watched_paths` on the event thread, so
        // never hold it across a call into the platform watcher.
        let dir_watched = {
            let paths = self.watched_paths.lock();
            if paths.contains(&key) {
                return Ok(());
            }
            paths.iter().any(|p| p.parent() == Some(dir.as_path()))
        };

        if !dir_watched {
            self.watcher
                .lock()
                .watch(&dir, RecursiveMode::NonRecursive)
                .map_err(|e| ConfigError::WatchError(format!("Failed to watch path: {}", e)))?;
        }

        self.watched_paths.lock().push(key);
        Ok(())
    }

    /// Stop watching a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or its directory
    /// cannot be unwatched.
    pub fn unwatch(&self, path: impl AsRef<Path>) -> Result<()> {
        let (dir, key) = watch_key(path.as_ref())?;

        let dir_still_used = {
            let mut paths = self.watched_paths.lock();
            paths.retain(|p| p != &key);
            paths.iter().any(|p| p.parent() == Some(dir.as_path()))
        };

        if !dir_still_used {
            self.watcher
                .lock()
                .unwatch(&dir)
                .map_err(|e| ConfigError::WatchError(format!("Failed to unwatch path: {}", e)))?;
        }

        Ok(())
    }

    /// Get the debounce duration for this watcher.
    pub fn debounce_duration(&self) -> Duration {
        self.debounce_duration
    }

    /// Get the files currently being watched.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watched_paths.lock().clone()
    }
}

/// Canonical parent directory, and that directory joined with the file name.
///
/// Only the directory is resolved, so a config file that is itself a
/// symlink still matches the events reported for the link.
fn watch_key(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let io_error = |source: std::io::Error| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    };

    path.metadata().map_err(io_error)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigError::WatchError(format!("Not a file: {}", path.display())))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = parent.canonicalize().map_err(io_error)?;

    let key = dir.join(file_name);
    Ok((dir, key))
}

/// Reload `path` into `store` whenever the file changes.
///
/// Each debounced change triggers one [`ConfigStore::reload`]. Failed
/// reloads are logged and the current document is kept. Must be called from
/// within a tokio runtime.
///
/// # Errors
///
/// Returns an error if the file cannot be watched.
///
/// # Examples
///
/// ```rust,no_run
/// use exporter_config::prelude::*;
/// use exporter_config::reload::spawn_watch_reload;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let store = ConfigStore::from_file("config.yml")?;
/// let _task = spawn_watch_reload(store.clone(), "config.yml", Duration::from_millis(500))?;
/// # Ok(())
/// # }
/// ```
pub fn spawn_watch_reload(
    store: ConfigStore,
    path: impl Into<PathBuf>,
    debounce: Duration,
) -> Result<ReloadTask> {
    let path = path.into();
    let (watcher, mut rx) = ConfigWatcher::new(debounce)?;
    watcher.watch(&path)?;

    tracing::info!(path = %path.display(), ?debounce, "watching configuration file");

    let handle = tokio::spawn(async move {
        while rx.recv().await.is_some() {
            reload_and_log(&store, &path);
        }
    });

    Ok(ReloadTask::new(handle).with_watcher(watcher))
}
