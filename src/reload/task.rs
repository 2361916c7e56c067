//! Background reload tasks.

use crate::core::ConfigStore;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a background reload task.
///
/// Dropping the handle stops the task. For watch-based reloads it also owns
/// the file watcher, which is released with it.
pub struct ReloadTask {
    handle: JoinHandle<()>,
    #[cfg(feature = "file-watch")]
    _watcher: Option<super::ConfigWatcher>,
}

impl ReloadTask {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self {
            handle,
            #[cfg(feature = "file-watch")]
            _watcher: None,
        }
    }

    #[cfg(feature = "file-watch")]
    pub(crate) fn with_watcher(mut self, watcher: super::ConfigWatcher) -> Self {
        self._watcher = Some(watcher);
        self
    }

    /// Stop the task.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Whether the task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ReloadTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Reload `path` into `store` every `interval`.
///
/// The first reload happens one full interval after the call; load the
/// initial document at startup instead. Must be called from within a tokio
/// runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use exporter_config::prelude::*;
/// use exporter_config::reload::spawn_periodic_reload;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let store = ConfigStore::from_file("config.yml")?;
/// let _task = spawn_periodic_reload(store.clone(), "config.yml", Duration::from_secs(30));
/// # Ok(())
/// # }
/// ```
pub fn spawn_periodic_reload(
    store: ConfigStore,
    path: impl Into<PathBuf>,
    interval: Duration,
) -> ReloadTask {
    let path = path.into();
    tracing::info!(path = %path.display(), ?interval, "periodic configuration reload started");

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            reload_and_log(&store, &path);
        }
    });

    ReloadTask::new(handle)
}

/// Reload once and report the outcome.
pub(crate) fn reload_and_log(store: &ConfigStore, path: &Path) {
    match store.reload(path) {
        Ok(()) => {
            tracing::info!(
                path = %path.display(),
                version = store.version(),
                "configuration reloaded"
            );
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to reload configuration, keeping current document"
            );
        }
    }
}

#[cfg(all(test, feature = "yaml"))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn test_periodic_reload_picks_up_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exporter.yml");
        fs::write(&path, "loglevel: info\n").unwrap();

        let store = ConfigStore::from_file(&path).unwrap();
        let _task = spawn_periodic_reload(store.clone(), &path, Duration::from_millis(50));

        fs::write(&path, "loglevel: debug\n").unwrap();

        let result = timeout(Duration::from_secs(2), async {
            while store.app_log_level() != "debug" {
                sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        assert!(result.is_ok());
        assert!(store.version() >= 2);
    }

    #[tokio::test]
    async fn test_failed_periodic_reload_keeps_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exporter.yml");
        fs::write(&path, "loglevel: warn\n").unwrap();

        let store = ConfigStore::from_file(&path).unwrap();
        fs::write(&path, "hosts: [unclosed").unwrap();

        let _task = spawn_periodic_reload(store.clone(), &path, Duration::from_millis(20));
        sleep(Duration::from_millis(200)).await;

        assert_eq!(store.version(), 1);
        assert_eq!(store.app_log_level(), "warn");
    }

    #[tokio::test]
    async fn test_abort_stops_task() {
        let store = ConfigStore::new();
        let task = spawn_periodic_reload(store, "/nonexistent/exporter.yml", Duration::from_millis(10));

        task.abort();
        sleep(Duration::from_millis(50)).await;
        assert!(task.is_finished());
    }
}
