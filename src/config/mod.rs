//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → deck default headers, server limits, log setup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the dispatcher never reads it directly
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig, ResponseConfig, ServerConfig,
};
