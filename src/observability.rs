//! Tracing setup.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Initialises the global JSON subscriber. `RUST_LOG` wins over the
/// configured `service.log_level` when set. Call once at startup.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.service.log_level.clone()));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .init();

    tracing::info!(service = %config.service.name, "tracing initialized");
}
