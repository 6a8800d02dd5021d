//! Configuration schema definitions.
//!
//! This module defines the configuration for serving a dispatcher over
//! HTTP. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::http::response::Headers;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request size and time limits.
    pub limits: LimitsConfig,

    /// Response defaults applied by the dispatcher deck.
    pub response: ResponseConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body buffered before dispatch, in bytes.
    pub max_body_bytes: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Response defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ResponseConfig {
    /// Headers every response starts with.
    pub default_headers: Headers,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Pretty for development, JSON for log aggregation.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "pathwalk=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
