//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, bind address parses)
//! - Reject default headers that cannot go on the wire
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use http::{HeaderName, HeaderValue};
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("limits.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("response.default_headers has invalid header name `{0}`")]
    InvalidHeaderName(String),

    #[error("response.default_headers value for `{0}` is not a valid header value")]
    InvalidHeaderValue(String),
}

/// Check a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (name, value) in &config.response.default_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        } else if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
