//! Tracing subscriber setup for host applications.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the host, which can call [`init_tracing`] once at startup.

use crate::config::{LogFormat, MonitoringConfig};
use crate::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a global subscriber using `RUST_LOG` when set, else the configured level.
///
/// Returns [`Error::Telemetry`] if a global subscriber is already installed.
pub fn init_tracing(config: &MonitoringConfig) -> Result<()> {
    let filter = build_filter(config);

    let result = match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| Error::Telemetry(e.to_string()))
}

fn build_filter(config: &MonitoringConfig) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.log_level.as_filter())
    }
}
