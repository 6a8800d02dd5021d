//! Early exit through nested match levels.
//!
//! # Design Decisions
//! - A halt travels up the match tree as the `Err` side of [`Flow`], so `?`
//!   after every matcher is all a rule needs to stop its siblings
//! - A halt never crosses a dispatcher boundary; `Dispatcher::call` turns it
//!   back into a plain value
//! - Collaborator failures ride the same channel and reach the caller
//!   untouched

use thiserror::Error;

use crate::http::response::Response;

/// Outcome of evaluating part of a match tree.
///
/// `Ok(())` means nothing at this level handled the request.
pub type Flow = Result<(), Halt>;

/// Why evaluation stopped.
#[derive(Debug)]
pub enum Halt {
    /// A branch produced the final response.
    Respond(Response),
    /// A rule body failed.
    Fail(DispatchError),
}

impl From<Response> for Halt {
    fn from(response: Response) -> Self {
        Halt::Respond(response)
    }
}

impl From<DispatchError> for Halt {
    fn from(err: DispatchError) -> Self {
        Halt::Fail(err)
    }
}

impl From<serde_json::Error> for Halt {
    fn from(err: serde_json::Error) -> Self {
        Halt::Fail(DispatchError::Json(err))
    }
}

/// Errors surfaced by a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A collaborator called from a rule body failed.
    #[error("handler error: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A JSON body could not be serialized.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The response triple cannot be expressed as an HTTP response.
    #[error("invalid response: {0}")]
    Http(#[from] http::Error),

    /// Status outside the valid HTTP range.
    #[error("invalid status code {0}")]
    InvalidStatus(u16),
}

impl DispatchError {
    /// Wrap any error raised inside a rule body.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        DispatchError::Handler(err.into())
    }
}
