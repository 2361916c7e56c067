//! Demo: serve credential lookups while the config file is edited.
//!
//! This example shows how to:
//! - Build a store from a YAML file at startup
//! - Initialize logging from the configured log level
//! - Reload automatically when the file changes
//!
//! Run with: cargo run --example hot_reload
//!
//! While running, edit demos/config/exporter.yml and watch the resolved
//! credentials change. Break the YAML on purpose to see the previous
//! document kept.

use exporter_config::prelude::*;
use exporter_config::reload::spawn_watch_reload;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "demos/config/exporter.yml";

#[tokio::main]
async fn main() -> Result<()> {
    let store = ConfigStore::builder().with_file(CONFIG_PATH).build()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(store.app_log_level())),
        )
        .init();

    let _reload = spawn_watch_reload(store.clone(), CONFIG_PATH, Duration::from_millis(500))?;

    tracing::info!(path = CONFIG_PATH, "edit the file to trigger a reload, Ctrl+C to exit");

    let mut ticker = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = ticker.tick() => report(&store),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

fn report(store: &ConfigStore) {
    for target in ["10.0.0.5", "10.0.0.99"] {
        match store.host_config_for_target(target) {
            Ok(host) => tracing::info!(
                version = store.version(),
                host = target,
                username = %host.username,
                collectors = ?host.collectors,
                "target resolved"
            ),
            Err(e) => tracing::warn!(host = target, error = %e, "no credentials"),
        }
    }

    match store.host_config_for_group("lab") {
        Ok(host) => tracing::info!(group = "lab", username = %host.username, "group resolved"),
        Err(e) => tracing::warn!(group = "lab", error = %e, "no credentials"),
    }
}
