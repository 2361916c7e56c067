//! The shared configuration store providing lock-free resolution.

use crate::core::{ConfigDocument, DocumentFormat, HostConfig, load_document_as};
use crate::error::{ConfigError, LookupKind, Result};
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use crate::metrics::ConfigMetrics;

/// Log level reported when the document does not set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Host key used as the catch-all for targets without their own entry.
pub const DEFAULT_HOST_KEY: &str = "default";

/// One published version of the configuration document.
#[derive(Debug)]
pub struct Snapshot {
    version: u64,
    published_at: Instant,
    document: ConfigDocument,
}

impl Snapshot {
    /// Monotonic version number, starting at 1 for the first publish.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The document published in this version.
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Time elapsed since this version was published.
    pub fn age(&self) -> Duration {
        self.published_at.elapsed()
    }

    fn resolve_target(&self, target: &str) -> Option<HostConfig> {
        let hosts = &self.document.hosts;
        hosts
            .get(target)
            .or_else(|| hosts.get(DEFAULT_HOST_KEY))
            .map(|host| host.resolved(&self.document.collectors))
    }

    fn resolve_group(&self, group: &str) -> Option<HostConfig> {
        self.document
            .groups
            .get(group)
            .map(|host| host.resolved(&self.document.collectors))
    }
}

/// Process-wide holder of the current configuration document.
///
/// Reads load the current [`Snapshot`] through `arc-swap` and never block;
/// every resolution call works on exactly one published version. Publishing
/// is serialized by a writer lock that is held only for the pointer swap,
/// never while a file is read or parsed.
///
/// Clones share the same underlying state, so one store is built at startup
/// and handed to request handlers and reload triggers alike.
///
/// # Examples
///
/// ```rust
/// use exporter_config::prelude::*;
///
/// let store = ConfigStore::with_document(
///     ConfigDocument::default()
///         .with_host("default", HostConfig::new("monitor", "secret"))
///         .with_collectors(["system"]),
/// );
///
/// let creds = store.host_config_for_target("10.1.2.3")?;
/// assert_eq!(creds.username, "monitor");
/// assert_eq!(creds.collectors, vec!["system"]);
/// # Ok::<(), exporter_config::error::ConfigError>(())
/// ```
#[derive(Clone)]
pub struct ConfigStore {
    /// The current snapshot, `None` until the first publish
    current: Arc<ArcSwapOption<Snapshot>>,
    /// Serializes publishes and holds the last issued version
    writer: Arc<Mutex<u64>>,
    /// Format override for reloads, detected from the path when unset
    format: Option<DocumentFormat>,
    #[cfg(feature = "metrics")]
    metrics: Option<ConfigMetrics>,
}

impl ConfigStore {
    /// Create a store with no document loaded.
    ///
    /// Target and group lookups fail with [`ConfigError::NotFound`] until
    /// a document is published.
    pub fn new() -> Self {
        Self {
            current: Arc::new(ArcSwapOption::empty()),
            writer: Arc::new(Mutex::new(0)),
            format: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Create a store with an initial document as version 1.
    pub fn with_document(document: ConfigDocument) -> Self {
        let store = Self::new();
        store.publish(document);
        store
    }

    /// Create a store from a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new();
        store.reload(path)?;
        Ok(store)
    }

    pub(crate) fn set_format(&mut self, format: Option<DocumentFormat>) {
        self.format = format;
    }

    #[cfg(feature = "metrics")]
    pub(crate) fn set_metrics(&mut self, metrics: ConfigMetrics) {
        self.metrics = Some(metrics);
    }

    /// Read and parse `path`, then publish the result.
    ///
    /// The file is read and parsed before any lock is taken. On failure the
    /// current document stays in place and the error is returned. The store
    /// never logs; reporting is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read and
    /// [`ConfigError::ParseError`] if its contents are not a valid document.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use exporter_config::prelude::*;
    /// # fn example(store: &ConfigStore) {
    /// if let Err(e) = store.reload("/etc/exporter/config.yml") {
    ///     eprintln!("keeping previous configuration: {}", e);
    /// }
    /// # }
    /// ```
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = self.format.unwrap_or_else(|| DocumentFormat::from_path(path));

        #[cfg(feature = "metrics")]
        let timer = self.metrics.as_ref().map(|m| m.start_reload());

        let loaded = load_document_as(path, format);

        #[cfg(feature = "metrics")]
        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            match &loaded {
                Ok(_) => metrics.record_reload_success(timer),
                Err(_) => metrics.record_reload_failure(timer),
            }
        }

        self.publish(loaded?);
        Ok(())
    }

    /// Publish `document` as the new current version.
    ///
    /// Returns the version assigned to it. Readers that loaded the previous
    /// snapshot keep seeing it until they drop their reference.
    pub fn publish(&self, document: ConfigDocument) -> u64 {
        #[cfg(feature = "metrics")]
        let (hosts, groups) = (document.hosts.len(), document.groups.len());

        let mut last = self.writer.lock();
        *last += 1;
        let version = *last;
        self.current.store(Some(Arc::new(Snapshot {
            version,
            published_at: Instant::now(),
            document,
        })));

        // Recorded under the writer lock so the gauges track the latest version.
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_publish(hosts, groups);
        }

        drop(last);
        version
    }

    /// The current snapshot, or `None` if nothing has been published.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Version of the current snapshot, `0` if nothing has been published.
    pub fn version(&self) -> u64 {
        self.with_snapshot(|snapshot| snapshot.map_or(0, Snapshot::version))
    }

    /// Whether a document has been published.
    pub fn is_loaded(&self) -> bool {
        self.with_snapshot(|snapshot| snapshot.is_some())
    }

    /// Resolve credentials and collectors for a monitored target.
    ///
    /// Looks up `target` in the document's hosts, falling back to the
    /// `"default"` host entry. An entry without its own collectors gets the
    /// global collector list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if neither `target` nor `"default"`
    /// is configured.
    pub fn host_config_for_target(&self, target: &str) -> Result<HostConfig> {
        self.with_snapshot(|snapshot| snapshot.and_then(|s| s.resolve_target(target)))
            .ok_or_else(|| self.miss(LookupKind::Target, target))
    }

    /// Resolve credentials and collectors for an administrative group.
    ///
    /// Unlike targets, groups never fall back to a `"default"` entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `group` is not configured.
    pub fn host_config_for_group(&self, group: &str) -> Result<HostConfig> {
        self.with_snapshot(|snapshot| snapshot.and_then(|s| s.resolve_group(group)))
            .ok_or_else(|| self.miss(LookupKind::Group, group))
    }

    /// The configured log level, or [`DEFAULT_LOG_LEVEL`] when unset.
    pub fn app_log_level(&self) -> String {
        self.with_snapshot(|snapshot| match snapshot {
            Some(s) if !s.document.log_level.is_empty() => s.document.log_level.clone(),
            _ => DEFAULT_LOG_LEVEL.to_string(),
        })
    }

    /// Run `f` against the current snapshot without bumping its refcount.
    fn with_snapshot<R>(&self, f: impl FnOnce(Option<&Snapshot>) -> R) -> R {
        let current = self.current.load();
        f((*current).as_deref())
    }

    fn miss(&self, kind: LookupKind, key: &str) -> ConfigError {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_lookup_miss(kind);
        }

        ConfigError::not_found(kind, key)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
