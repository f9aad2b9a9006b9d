//! Tracing bootstrap for the bedboard service.
//!
//! `RUST_LOG` wins when set; otherwise the filter comes from
//! [`TelemetryConfig::log_filter`] (the `BEDBOARD_LOG` variable). Output is
//! compact single-line text without ANSI escapes so ward consoles and log
//! shippers both read it cleanly.

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter '{value}' is not a valid tracing directive")]
    InvalidFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInitialized(Box<dyn std::error::Error + Send + Sync>),
}

/// Install the global tracing subscriber. Call once, before serving traffic.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter).map_err(|source| {
            TelemetryError::InvalidFilter {
                value: config.log_filter.clone(),
                source,
            }
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::AlreadyInitialized)
}
