//! Configuration metrics tracking using OpenTelemetry.

use crate::error::LookupKind;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Metrics collector for reloads and credential lookups.
///
/// # Examples
///
/// ```rust,no_run
/// use exporter_config::metrics::ConfigMetrics;
/// use opentelemetry::global;
///
/// let metrics = ConfigMetrics::new(global::meter("exporter"));
///
/// let timer = metrics.start_reload();
/// // ... read and parse the file ...
/// metrics.record_reload_success(timer);
/// ```
#[derive(Clone)]
pub struct ConfigMetrics {
    reload_attempts: Counter<u64>,
    reload_success: Counter<u64>,
    reload_failures: Counter<u64>,
    reload_duration: Histogram<f64>,
    config_age_seconds: Gauge<i64>,
    document_hosts: Gauge<i64>,
    document_groups: Gauge<i64>,
    lookup_misses: Counter<u64>,
    last_publish: Arc<Mutex<Instant>>,
}

impl ConfigMetrics {
    /// Create a metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let reload_attempts = meter
            .u64_counter("exporter_config.reload.attempts")
            .with_description("Total number of reload attempts")
            .build();

        let reload_success = meter
            .u64_counter("exporter_config.reload.success")
            .with_description("Number of successful reloads")
            .build();

        let reload_failures = meter
            .u64_counter("exporter_config.reload.failures")
            .with_description("Number of failed reloads")
            .build();

        let reload_duration = meter
            .f64_histogram("exporter_config.reload.duration")
            .with_description("Time spent reading and parsing the configuration file")
            .with_unit("s")
            .build();

        let config_age_seconds = meter
            .i64_gauge("exporter_config.age")
            .with_description("Time since the current document was published")
            .with_unit("s")
            .build();

        let document_hosts = meter
            .i64_gauge("exporter_config.document.hosts")
            .with_description("Number of host entries in the current document")
            .build();

        let document_groups = meter
            .i64_gauge("exporter_config.document.groups")
            .with_description("Number of group entries in the current document")
            .build();

        let lookup_misses = meter
            .u64_counter("exporter_config.lookup.misses")
            .with_description("Lookups that matched no target, default or group entry")
            .build();

        Self {
            reload_attempts,
            reload_success,
            reload_failures,
            reload_duration,
            config_age_seconds,
            document_hosts,
            document_groups,
            lookup_misses,
            last_publish: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Start a reload timer.
    ///
    /// Pass the returned `Instant` to [`record_reload_success`](Self::record_reload_success)
    /// or [`record_reload_failure`](Self::record_reload_failure).
    pub fn start_reload(&self) -> Instant {
        self.reload_attempts.add(1, &[]);
        Instant::now()
    }

    /// Record a reload whose file was read and parsed.
    pub fn record_reload_success(&self, start: Instant) {
        self.reload_success.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a reload that failed to read or parse.
    pub fn record_reload_failure(&self, start: Instant) {
        self.reload_failures.add(1, &[]);
        self.reload_duration.record(start.elapsed().as_secs_f64(), &[]);
    }

    /// Record a newly published document and its size.
    pub fn record_publish(&self, hosts: usize, groups: usize) {
        self.document_hosts.record(hosts as i64, &[]);
        self.document_groups.record(groups as i64, &[]);
        *self.last_publish.lock() = Instant::now();
    }

    /// Record a lookup that found no entry.
    pub fn record_lookup_miss(&self, kind: LookupKind) {
        self.lookup_misses
            .add(1, &[KeyValue::new("kind", kind.as_str())]);
    }

    /// Update the configuration age gauge.
    ///
    /// Call this periodically, e.g. from the exporter's own scrape handler.
    pub fn update_config_age(&self) {
        let age_secs = self.last_publish.lock().elapsed().as_secs() as i64;
        self.config_age_seconds.record(age_secs, &[]);
    }
}
