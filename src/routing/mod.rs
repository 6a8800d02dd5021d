//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Env (path info, method, inbox slot)
//!     → dispatcher.rs (fresh Context per call, deck hooks)
//!     → context.rs (on / root / verbs / run / halt)
//!     → matcher.rs (literal, capture, always, never)
//!     → cursor.rs (consume, capture, root?)
//!     → first entered branch halts → Response
//!     → no branch entered → ResponseBuilder::finish()
//! ```
//!
//! # Design Decisions
//! - The match tree is plain Rust code; nothing is compiled ahead of time
//! - Halting is a `Result` short-circuit scoped to one dispatch call
//! - Dispatchers are immutable and shareable; all mutable state lives in
//!   the per-request context

pub mod context;
pub mod cursor;
pub mod deck;
pub mod dispatcher;
pub mod flow;
pub mod inbox;
pub mod matcher;

pub use context::Context;
pub use cursor::PathCursor;
pub use deck::{BasicDeck, ConfiguredDeck, Deck};
pub use dispatcher::Dispatcher;
pub use flow::{DispatchError, Flow, Halt};
pub use inbox::Inbox;
pub use matcher::{capture, Token};
