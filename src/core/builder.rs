//! Builder for constructing ConfigStore instances.

use crate::core::{ConfigStore, DocumentFormat};
use crate::error::Result;
use std::path::PathBuf;

#[cfg(feature = "metrics")]
use crate::metrics::ConfigMetrics;

/// Builder for constructing a [`ConfigStore`] at startup.
///
/// # Examples
///
/// ```rust,no_run
/// use exporter_config::prelude::*;
///
/// # fn example() -> Result<()> {
/// let store = ConfigStore::builder()
///     .with_file("/etc/exporter/config.yml")
///     .build()?;
///
/// println!("log level: {}", store.app_log_level());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ConfigStoreBuilder {
    file_path: Option<PathBuf>,
    format: Option<DocumentFormat>,
    #[cfg(feature = "metrics")]
    metrics: Option<ConfigMetrics>,
}

impl ConfigStoreBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load this file as the initial document.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Parse every file as `format` instead of detecting it from the extension.
    ///
    /// Applies to the initial load and to later [`ConfigStore::reload`] calls.
    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Record reload and lookup metrics with the given meter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use exporter_config::prelude::*;
    /// use opentelemetry::global;
    ///
    /// # fn example() -> Result<()> {
    /// let store = ConfigStore::builder()
    ///     .with_file("config.yml")
    ///     .with_metrics(global::meter("exporter"))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(ConfigMetrics::new(meter));
        self
    }

    /// Build the store, loading the initial file if one was given.
    ///
    /// Without a file the store starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial file cannot be read or parsed. The
    /// caller decides whether that is fatal at startup.
    pub fn build(self) -> Result<ConfigStore> {
        let mut store = ConfigStore::new();
        store.set_format(self.format);

        #[cfg(feature = "metrics")]
        if let Some(metrics) = self.metrics {
            store.set_metrics(metrics);
        }

        if let Some(path) = &self.file_path {
            store.reload(path)?;
        }

        Ok(store)
    }
}

impl ConfigStore {
    /// Create a new builder for constructing a store.
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_without_file_is_empty() {
        let store = ConfigStoreBuilder::new().build().unwrap();
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_build_missing_file_fails() {
        let result = ConfigStore::builder()
            .with_file("/nonexistent/exporter.yml")
            .build();
        assert!(matches!(result, Err(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_builder_records_options() {
        let builder = ConfigStoreBuilder::new()
            .with_file("exporter.cfg")
            .with_format(DocumentFormat::Json);

        assert_eq!(builder.file_path, Some(PathBuf::from("exporter.cfg")));
        assert_eq!(builder.format, Some(DocumentFormat::Json));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_build_with_format_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("exporter.cfg");
        fs::write(&path, "loglevel: debug\ncollectors: [system]\n").unwrap();

        let store = ConfigStore::builder()
            .with_file(&path)
            .with_format(DocumentFormat::Yaml)
            .build()
            .unwrap();

        assert_eq!(store.version(), 1);
        assert_eq!(store.app_log_level(), "debug");
    }
}
