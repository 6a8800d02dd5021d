//! Segment-walking HTTP dispatch.
//!
//! A [`Dispatcher`] owns a match tree written as ordinary Rust closures.
//! Each request gets a fresh [`Context`]; the tree walks path segments with
//! `on`, `root` and the verb matchers, writes into `res`, and the first
//! branch it enters ends the dispatch with a `(status, headers, body)`
//! triple.
//!
//! ```
//! use pathwalk::{capture, Dispatcher, Env};
//!
//! let app = Dispatcher::new(|c| {
//!     c.on("users", |c| {
//!         c.on(capture("id"), |c| {
//!             let id = c.param("id").unwrap_or_default().to_string();
//!             c.res.write(id);
//!             Ok(())
//!         })
//!     })
//! });
//!
//! let response = app.call(&mut Env::get("/users/42")).unwrap();
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body_bytes(), "42");
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{CookieOptions, Env, Headers, HttpServer, Request, Response, ResponseBuilder};
pub use lifecycle::Shutdown;
pub use routing::{
    capture, Context, Deck, DispatchError, Dispatcher, Flow, Halt, Inbox, PathCursor, Token,
};
