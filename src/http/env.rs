//! Request environment handed to a dispatcher.
//!
//! # Responsibilities
//! - Carry method, script name, path info, query, headers and body
//! - Hold the inbox side channel used by nested dispatch
//! - Swap path info and script name for the duration of a nested call
//!
//! # Design Decisions
//! - The inbox sits in the typed extension map behind a private newtype,
//!   so no other environment data can collide with it
//! - [`EnvScope`] restores the swapped fields when dropped, which covers
//!   normal return, halts, errors and panic unwinds alike

use std::ops::{Deref, DerefMut};

use bytes::Bytes;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method};

use crate::routing::inbox::Inbox;

/// Name under which the inbox slot shows up in logs.
pub const INBOX_KEY: &str = "pathwalk.inbox";

#[derive(Debug, Clone)]
struct InboxSlot(Inbox);

/// The incoming request as seen by the routing core.
#[derive(Debug, Clone, Default)]
pub struct Env {
    method: Method,
    script_name: String,
    path_info: String,
    query_string: String,
    headers: HeaderMap,
    body: Bytes,
    extensions: Extensions,
}

impl Env {
    /// Build an environment for `target`, which may carry a `?query`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Self {
            method,
            path_info: path.to_string(),
            query_string: query.to_string(),
            ..Self::default()
        }
    }

    /// `GET` environment for `target`.
    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    /// `POST` environment for `target`.
    pub fn post(target: &str) -> Self {
        Self::new(Method::POST, target)
    }

    /// Build from the parts of an `http` request and its buffered body.
    pub fn from_parts(parts: &http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method.clone(),
            script_name: String::new(),
            path_info: parts.uri.path().to_string(),
            query_string: parts.uri.query().unwrap_or_default().to_string(),
            headers: parts.headers.clone(),
            body,
            extensions: Extensions::new(),
        }
    }

    /// Append a request header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace the buffered body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Mount the environment under `script_name`.
    pub fn with_script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self
    }

    /// Prefill the inbox slot.
    pub fn with_inbox(mut self, inbox: Inbox) -> Self {
        self.set_inbox(inbox);
        self
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Prefix already consumed by outer dispatchers.
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// Replace the consumed prefix.
    pub fn set_script_name(&mut self, script_name: impl Into<String>) {
        self.script_name = script_name.into();
    }

    /// Path left for this dispatcher to match.
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Replace the path left to match.
    pub fn set_path_info(&mut self, path_info: impl Into<String>) {
        self.path_info = path_info.into();
    }

    /// Raw query string without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Buffered request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Typed side-channel values.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable side-channel values.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// The inbox left for the next dispatcher, if any.
    pub fn inbox(&self) -> Option<&Inbox> {
        self.extensions.get::<InboxSlot>().map(|slot| &slot.0)
    }

    /// Store an inbox for the next dispatcher, returning the previous one.
    pub fn set_inbox(&mut self, inbox: Inbox) -> Option<Inbox> {
        self.extensions.insert(InboxSlot(inbox)).map(|slot| slot.0)
    }

    /// Empty the inbox slot, returning what it held.
    pub fn take_inbox(&mut self) -> Option<Inbox> {
        self.extensions.remove::<InboxSlot>().map(|slot| slot.0)
    }

    /// Rewrite script name, path info and inbox until the scope drops.
    pub fn scoped(
        &mut self,
        script_name: String,
        path_info: String,
        inbox: Inbox,
    ) -> EnvScope<'_> {
        let saved_script = std::mem::replace(&mut self.script_name, script_name);
        let saved_path = std::mem::replace(&mut self.path_info, path_info);
        let saved_inbox = self.set_inbox(inbox);

        EnvScope {
            env: self,
            script_name: saved_script,
            path_info: saved_path,
            inbox: saved_inbox,
        }
    }
}

/// Borrow of an [`Env`] with rewritten routing fields.
///
/// Dropping it puts the original values back.
#[derive(Debug)]
pub struct EnvScope<'e> {
    env: &'e mut Env,
    script_name: String,
    path_info: String,
    inbox: Option<Inbox>,
}

impl Deref for EnvScope<'_> {
    type Target = Env;
    fn deref(&self) -> &Self::Target {
        self.env
    }
}

impl DerefMut for EnvScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env
    }
}

impl Drop for EnvScope<'_> {
    fn drop(&mut self) {
        self.env.script_name = std::mem::take(&mut self.script_name);
        self.env.path_info = std::mem::take(&mut self.path_info);
        match self.inbox.take() {
            Some(inbox) => {
                self.env.set_inbox(inbox);
            }
            None => {
                self.env.take_inbox();
            }
        }
    }
}
