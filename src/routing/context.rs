//! Per-request dispatch state and the matcher vocabulary.
//!
//! # Evaluation Model
//! ```text
//! on(token, body)
//!     → token matches?  no  → Ok(()), siblings keep running
//!                       yes → body runs
//!                           → finish: Err(Halt::Respond(res.finish()))
//! ```
//! A branch that was entered always ends the dispatch, even when its body
//! wrote nothing (the response is then a 404). There is no fallthrough to
//! the next sibling after a partial match.
//!
//! # Design Decisions
//! - Verb matchers only fire at the root of the current nesting level
//! - `run` rewrites the environment through a scope guard, so the outer
//!   request looks untouched once the nested call returns for any reason

use http::Method;

use crate::http::env::Env;
use crate::http::request::Request;
use crate::http::response::{Headers, Response, ResponseBuilder};
use crate::routing::cursor::PathCursor;
use crate::routing::dispatcher::Dispatcher;
use crate::routing::flow::{Flow, Halt};
use crate::routing::inbox::Inbox;
use crate::routing::matcher::Token;

/// Everything a match tree sees while handling one request.
#[derive(Debug)]
pub struct Context<'a> {
    env: &'a mut Env,
    path: PathCursor,
    /// Response being accumulated.
    pub res: ResponseBuilder,
    /// Captures and values forwarded from an outer dispatcher.
    pub inbox: Inbox,
}

impl<'a> Context<'a> {
    pub(crate) fn new(env: &'a mut Env, inbox: Inbox, default_headers: Headers) -> Self {
        let path = PathCursor::new(env.path_info());
        Self {
            env,
            path,
            res: ResponseBuilder::new(default_headers),
            inbox,
        }
    }

    /// Raw request environment.
    pub fn env(&self) -> &Env {
        self.env
    }

    /// Read-only request view.
    pub fn req(&self) -> Request<'_> {
        Request::new(self.env)
    }

    /// Cursor over the path being matched.
    pub fn path(&self) -> &PathCursor {
        &self.path
    }

    /// Captured or forwarded string value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.inbox.get_str(name)
    }

    /// Whether the path is fully consumed.
    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// Consume `literal` as a whole segment.
    pub fn consume(&mut self, literal: &str) -> bool {
        self.path.consume(literal)
    }

    /// Capture the next segment into the inbox under `name`.
    pub fn capture(&mut self, name: &str) -> Option<String> {
        self.path.capture(name, &mut self.inbox)
    }

    /// Evaluate a single token against the path.
    pub fn matches<'t>(&mut self, token: impl Into<Token<'t>>) -> bool {
        token.into().eval(&mut self.path, &mut self.inbox)
    }

    /// Run `body`, then finish and halt.
    pub fn default<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        body(self)?;
        self.finish()
    }

    /// Enter `body` when `token` matches; the dispatch ends after it.
    pub fn on<'t, F>(&mut self, token: impl Into<Token<'t>>, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        if self.matches(token) {
            self.default(body)
        } else {
            Ok(())
        }
    }

    /// Enter `body` when the path is fully consumed.
    pub fn root<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        let at_root = self.is_root();
        self.on(at_root, body)
    }

    fn verb<F>(&mut self, method: Method, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        if *self.env.method() == method {
            self.root(body)
        } else {
            Ok(())
        }
    }

    /// Enter `body` for a `GET` at root.
    pub fn get<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        self.verb(Method::GET, body)
    }

    /// Enter `body` for a `PUT` at root.
    pub fn put<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        self.verb(Method::PUT, body)
    }

    /// Enter `body` for a `POST` at root.
    pub fn post<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        self.verb(Method::POST, body)
    }

    /// Enter `body` for a `PATCH` at root.
    pub fn patch<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        self.verb(Method::PATCH, body)
    }

    /// Enter `body` for a `DELETE` at root.
    pub fn delete<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        self.verb(Method::DELETE, body)
    }

    /// Enter `body` for a `HEAD` at root.
    pub fn head<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        self.verb(Method::HEAD, body)
    }

    /// Enter `body` for an `OPTIONS` request at root.
    pub fn options<F>(&mut self, body: F) -> Flow
    where
        F: FnOnce(&mut Self) -> Flow,
    {
        self.verb(Method::OPTIONS, body)
    }

    /// Hand the unconsumed path to `app` and halt with its response.
    ///
    /// The nested dispatcher sees the consumed prefix appended to the
    /// script name and the rest as its path info.
    pub fn run(&mut self, app: &Dispatcher, inbox: Inbox) -> Flow {
        let script_name = format!("{}{}", self.env.script_name(), self.path.prev());
        let path_info = self.path.curr().to_string();

        tracing::debug!(
            script_name = %script_name,
            path_info = %path_info,
            inbox_keys = inbox.len(),
            "Delegating to nested dispatcher"
        );

        let response = {
            let mut scope = self.env.scoped(script_name, path_info, inbox);
            app.call(&mut scope)?
        };
        Err(Halt::Respond(response))
    }

    /// Stop the whole dispatch with `response`.
    pub fn halt(&self, response: impl Into<Response>) -> Flow {
        Err(Halt::Respond(response.into()))
    }

    /// Stop the whole dispatch with whatever has been accumulated.
    pub fn finish(&mut self) -> Flow {
        let res = std::mem::take(&mut self.res);
        Err(Halt::Respond(res.finish()))
    }

    pub(crate) fn into_response(self) -> Response {
        self.res.finish()
    }
}
