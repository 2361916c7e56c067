//! Built-in metrics for reloads and lookups.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Reload attempts/success/failures
//! - Reload duration
//! - Document age and size
//! - Lookup misses by kind
//!
//! # Examples
//!
//! ```rust,no_run
//! use exporter_config::prelude::*;
//! use opentelemetry::global;
//!
//! # fn example() -> Result<()> {
//! let store = ConfigStore::builder()
//!     .with_file("config.yml")
//!     .with_metrics(global::meter("exporter"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod config_metrics;

pub use config_metrics::ConfigMetrics;
