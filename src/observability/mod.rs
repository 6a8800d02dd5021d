//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing core   → debug!/trace! (delegation, fallthrough)
//! http adapter   → dispatch span with request id, warn!/error!
//! tower-http     → request/response lines
//!     → logging.rs subscriber (pretty or JSON on stdout)
//! ```

pub mod logging;
