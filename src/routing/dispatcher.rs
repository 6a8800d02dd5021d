//! Dispatch entry point.
//!
//! # Responsibilities
//! - Own a match tree and the deck that prepares each context
//! - Build a fresh context per call and evaluate the tree once
//! - Turn the evaluation outcome into a response or an error
//!
//! # Design Decisions
//! - Immutable after construction; share across requests via `Arc`
//! - The inbox comes from the caller or from the environment slot that a
//!   parent `run` filled in, never from shared state

use std::fmt;
use std::sync::Arc;

use crate::http::env::Env;
use crate::http::response::Response;
use crate::routing::context::Context;
use crate::routing::deck::{BasicDeck, Deck};
use crate::routing::flow::{DispatchError, Flow, Halt};
use crate::routing::inbox::Inbox;

type MatchTree = dyn Fn(&mut Context<'_>) -> Flow + Send + Sync;

/// A routing application: a match tree plus its deck.
pub struct Dispatcher {
    tree: Box<MatchTree>,
    deck: Arc<dyn Deck>,
}

impl Dispatcher {
    /// Build a dispatcher with the default deck.
    pub fn new<F>(tree: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> Flow + Send + Sync + 'static,
    {
        Self::with_deck(BasicDeck, tree)
    }

    /// Build a dispatcher whose contexts are prepared by `deck`.
    pub fn with_deck<D, F>(deck: D, tree: F) -> Self
    where
        D: Deck + 'static,
        F: Fn(&mut Context<'_>) -> Flow + Send + Sync + 'static,
    {
        Self {
            tree: Box::new(tree),
            deck: Arc::new(deck),
        }
    }

    /// Dispatch using the inbox stored in `env`, or an empty one.
    pub fn call(&self, env: &mut Env) -> Result<Response, DispatchError> {
        let inbox = env.inbox().cloned().unwrap_or_default();
        self.call_with_inbox(env, inbox)
    }

    /// Dispatch with an explicit inbox.
    pub fn call_with_inbox(&self, env: &mut Env, inbox: Inbox) -> Result<Response, DispatchError> {
        let mut ctx = Context::new(env, inbox, self.deck.default_headers());

        let flow = self.deck.prepare(&mut ctx).and_then(|()| (self.tree)(&mut ctx));

        match flow {
            Ok(()) => {
                tracing::trace!(path = %ctx.path().curr(), "No branch halted, finishing");
                Ok(ctx.into_response())
            }
            Err(Halt::Respond(response)) => Ok(response),
            Err(Halt::Fail(err)) => Err(err),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::Headers;
    use crate::routing::matcher::capture;

    #[test]
    fn test_fallthrough_finishes_404() {
        let app = Dispatcher::new(|c| {
            c.on("users", |c| {
                c.res.write("users");
                Ok(())
            })
        });

        let response = app.call(&mut Env::get("/unmatched")).unwrap();
        assert_eq!(response.into_triple(), (404, Headers::new(), Vec::new()));
    }

    #[test]
    fn test_top_level_writes_without_branch() {
        let app = Dispatcher::new(|c| {
            c.res.write("hello");
            Ok(())
        });

        let response = app.call(&mut Env::get("/anything")).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body_bytes(), "hello");
    }

    #[test]
    fn test_inbox_read_from_env_slot() {
        let app = Dispatcher::new(|c| {
            let user = c.param("user").unwrap_or("nobody").to_string();
            c.res.write(user);
            Ok(())
        });

        let inbox: Inbox = [("user", "ana")].into_iter().collect();
        let mut env = Env::get("/").with_inbox(inbox);
        assert_eq!(app.call(&mut env).unwrap().body_bytes(), "ana");

        let mut env = Env::get("/");
        assert_eq!(app.call(&mut env).unwrap().body_bytes(), "nobody");
    }

    #[test]
    fn test_explicit_inbox_wins_over_slot() {
        let app = Dispatcher::new(|c| {
            let from = c.param("from").unwrap_or_default().to_string();
            c.res.write(from);
            Ok(())
        });

        let mut env = Env::get("/").with_inbox([("from", "slot")].into_iter().collect());
        let inbox: Inbox = [("from", "caller")].into_iter().collect();
        let response = app.call_with_inbox(&mut env, inbox).unwrap();
        assert_eq!(response.body_bytes(), "caller");
    }

    #[test]
    fn test_rule_error_propagates() {
        let app = Dispatcher::new(|c| {
            c.on("boom", |_| Err(DispatchError::handler("storage offline").into()))
        });

        let err = app.call(&mut Env::get("/boom")).unwrap_err();
        assert!(matches!(err, DispatchError::Handler(_)));
        assert_eq!(err.to_string(), "handler error: storage offline");
    }

    #[test]
    fn test_captures_do_not_leak_between_calls() {
        let app = Dispatcher::new(|c| {
            c.on(capture("id"), |c| {
                c.res.write(c.inbox.len().to_string());
                Ok(())
            })
        });

        for _ in 0..2 {
            let response = app.call(&mut Env::get("/7")).unwrap();
            assert_eq!(response.body_bytes(), "1");
        }
    }
}
