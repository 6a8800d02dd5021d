//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Pick the output format from configuration
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured filter

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Filter from `RUST_LOG`, falling back to the configured directive.
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
}

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
}
