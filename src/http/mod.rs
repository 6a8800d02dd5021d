//! HTTP collaborators of the routing core.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, body buffering)
//!     → env.rs (method, paths, headers, body, inbox slot)
//!     → [routing core evaluates the match tree]
//!         request.rs  read-only view for rule bodies
//!         response.rs accumulator, finish()
//!         cookie.rs   Set-Cookie rendering, Cookie parsing
//!     → server.rs (triple → HTTP response)
//!     → Send to client
//! ```

pub mod cookie;
pub mod env;
pub mod request;
pub mod response;
pub mod server;

pub use cookie::{CookieOptions, SameSite};
pub use env::{Env, EnvScope, INBOX_KEY};
pub use request::Request;
pub use response::{Headers, Response, ResponseBuilder};
pub use server::HttpServer;
