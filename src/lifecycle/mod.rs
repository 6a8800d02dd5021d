//! Process lifecycle.
//!
//! # Shutdown
//! ```text
//! Ctrl+C or Shutdown::trigger()
//!     → broadcast to subscribers
//!     → HttpServer stops accepting, drains in-flight requests
//!     → run() returns
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
