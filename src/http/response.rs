//! Response accumulation and finalization.
//!
//! # Responsibilities
//! - Collect status, headers and body chunks while rules run
//! - Keep `Content-Length` in step with every write
//! - Normalize whatever was collected into a well-formed triple
//!
//! # Design Decisions
//! - `finish` is the only place an unset status is resolved: 404 for an
//!   empty body, otherwise 200 with a default `Content-Type`
//! - Multiple cookies share one `Set-Cookie` value, one per line; the
//!   serving adapter splits them back into separate header fields

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

use crate::http::cookie::{self, CookieOptions};
use crate::routing::flow::DispatchError;

/// Response header map.
///
/// Keys keep the casing they were written with; lookups through this module
/// ignore ASCII case so `content-type` and `Content-Type` are one header.
pub type Headers = BTreeMap<String, String>;

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const LOCATION: &str = "Location";

const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// Stored key for `name`, ignoring ASCII case.
pub(crate) fn stored_key<'h>(headers: &'h Headers, name: &str) -> Option<&'h String> {
    headers.keys().find(|key| key.eq_ignore_ascii_case(name))
}

fn lookup<'h>(headers: &'h Headers, name: &str) -> Option<&'h str> {
    stored_key(headers, name).and_then(|key| headers.get(key)).map(String::as_str)
}

/// Set `name`, dropping any entry that differs from it only in case.
pub(crate) fn replace_header(headers: &mut Headers, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// Set `name` under whatever casing is already stored, or `name` itself.
fn update_header(headers: &mut Headers, name: &str, value: String) {
    let key = stored_key(headers, name)
        .cloned()
        .unwrap_or_else(|| name.to_string());
    headers.insert(key, value);
}

/// A finished response: status, headers, body chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<Bytes>,
}

impl Response {
    /// Assemble a response from its parts as-is.
    pub fn new(status: u16, headers: Headers, body: Vec<Bytes>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Header value, ignoring the case of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    /// All body chunks joined together.
    pub fn body_bytes(&self) -> Bytes {
        match self.body.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            chunks => Bytes::from(chunks.concat()),
        }
    }

    /// Split into `(status, headers, body)`.
    pub fn into_triple(self) -> (u16, Headers, Vec<Bytes>) {
        (self.status, self.headers, self.body)
    }
}

impl From<(u16, Headers, Vec<Bytes>)> for Response {
    fn from((status, headers, body): (u16, Headers, Vec<Bytes>)) -> Self {
        Self::new(status, headers, body)
    }
}

impl From<Response> for (u16, Headers, Vec<Bytes>) {
    fn from(response: Response) -> Self {
        response.into_triple()
    }
}

/// Mutable response state for one request.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    status: Option<u16>,
    headers: Headers,
    body: Vec<Bytes>,
    length: usize,
}

impl ResponseBuilder {
    /// Start a response carrying `headers` as defaults.
    pub fn new(headers: Headers) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Status set so far; `None` until a rule or redirect sets one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Fix the status; `finish` will not override it.
    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    /// Headers collected so far.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Header value, ignoring the case of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    /// Set a header, replacing any existing entry whatever its casing.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        replace_header(&mut self.headers, name.into(), value.into());
    }

    /// Body chunks written so far.
    pub fn body(&self) -> &[Bytes] {
        &self.body
    }

    /// Append a chunk and bump `Content-Length`.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        let chunk = Bytes::copy_from_slice(chunk.as_ref());
        self.length += chunk.len();
        self.body.push(chunk);
        update_header(&mut self.headers, CONTENT_LENGTH, self.length.to_string());
    }

    /// Serialize `value` as the body with a JSON content type.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), DispatchError> {
        let encoded = serde_json::to_vec(value)?;
        self.set_header(CONTENT_TYPE, "application/json");
        self.write(encoded);
        Ok(())
    }

    /// Point the client elsewhere with a 302.
    ///
    /// This does not stop evaluation; the caller halts.
    pub fn redirect(&mut self, path: impl Into<String>) {
        self.redirect_with(path, 302);
    }

    /// Redirect with an explicit status.
    pub fn redirect_with(&mut self, path: impl Into<String>, status: u16) {
        update_header(&mut self.headers, LOCATION, path.into());
        self.status = Some(status);
    }

    /// Add a `Set-Cookie` line. Values are not signed.
    pub fn set_cookie(&mut self, name: &str, options: impl Into<CookieOptions>) {
        cookie::append_set_cookie(&mut self.headers, name, &options.into());
    }

    /// Expire a cookie on the client.
    pub fn delete_cookie(&mut self, name: &str) {
        self.delete_cookie_with(name, CookieOptions::default());
    }

    /// Expire a cookie, matching the domain and path it was set with.
    pub fn delete_cookie_with(&mut self, name: &str, options: CookieOptions) {
        cookie::append_delete_cookie(&mut self.headers, name, &options);
    }

    /// Resolve the final status and hand over the triple.
    pub fn finish(mut self) -> Response {
        let status = match self.status {
            Some(status) => status,
            None if self.body.is_empty() => 404,
            None => {
                if stored_key(&self.headers, CONTENT_TYPE).is_none() {
                    self.headers
                        .insert(CONTENT_TYPE.to_string(), DEFAULT_CONTENT_TYPE.to_string());
                }
                200
            }
        };

        Response::new(status, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_untouched_response_is_404() {
        let response = ResponseBuilder::default().finish();
        assert_eq!(response.into_triple(), (404, Headers::new(), Vec::new()));
    }

    #[test]
    fn test_single_write_is_200_html() {
        let mut res = ResponseBuilder::default();
        res.write("x");

        let response = res.finish();
        assert_eq!(response.status, 200);
        assert_eq!(
            response.headers,
            headers(&[("Content-Type", "text/html"), ("Content-Length", "1")])
        );
        assert_eq!(response.body, vec![Bytes::from_static(b"x")]);
    }

    #[test]
    fn test_content_length_tracks_bytes() {
        let mut res = ResponseBuilder::default();
        res.write("héllo");
        res.write(" world");
        assert_eq!(res.header(CONTENT_LENGTH), Some("12"));
        assert_eq!(res.body().len(), 2);
        assert_eq!(res.finish().body_bytes(), Bytes::from("héllo world"));
    }

    #[test]
    fn test_existing_content_type_kept() {
        let mut res = ResponseBuilder::default();
        res.set_header(CONTENT_TYPE, "text/plain");
        res.write("ok");
        assert_eq!(res.finish().header(CONTENT_TYPE), Some("text/plain"));
    }

    #[test]
    fn test_lowercase_content_type_counts_as_set() {
        let mut res = ResponseBuilder::default();
        res.set_header("content-type", "application/json");
        res.write("{}");

        let response = res.finish();
        assert_eq!(
            response.headers,
            headers(&[("content-type", "application/json"), ("Content-Length", "2")])
        );
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_write_reuses_existing_length_key() {
        let mut res = ResponseBuilder::default();
        res.set_header("content-length", "99");
        res.write("abc");

        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.headers().get("content-length").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_set_header_replaces_other_casing() {
        let mut res = ResponseBuilder::default();
        res.set_header("X-Trace", "a");
        res.set_header("x-trace", "b");

        assert_eq!(res.headers(), &headers(&[("x-trace", "b")]));
    }

    #[test]
    fn test_redirect_ignores_body() {
        let mut res = ResponseBuilder::default();
        res.write("moved");
        res.redirect("/foo");

        let response = res.finish();
        assert_eq!(response.status, 302);
        assert_eq!(response.header(LOCATION), Some("/foo"));
        assert_eq!(response.header(CONTENT_TYPE), None);
    }

    #[test]
    fn test_redirect_with_status() {
        let mut res = ResponseBuilder::default();
        res.redirect_with("/new", 301);
        let response = res.finish();
        assert_eq!(response.status, 301);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_explicit_status_survives_empty_body() {
        let mut res = ResponseBuilder::default();
        res.set_status(204);
        assert_eq!(res.finish().status, 204);
    }

    #[test]
    fn test_default_headers_carried_through() {
        let res = ResponseBuilder::new(headers(&[("X-Frame-Options", "DENY")]));
        let response = res.finish();
        assert_eq!(response.status, 404);
        assert_eq!(response.header("X-Frame-Options"), Some("DENY"));
    }

    #[test]
    fn test_json_body() {
        let mut res = ResponseBuilder::default();
        res.json(&serde_json::json!({"id": 1})).unwrap();

        let response = res.finish();
        assert_eq!(response.header(CONTENT_TYPE), Some("application/json"));
        assert_eq!(response.body_bytes(), Bytes::from(r#"{"id":1}"#));
    }

    #[test]
    fn test_multiple_cookies_are_lines() {
        let mut res = ResponseBuilder::default();
        res.set_cookie("a", "1");
        res.set_cookie("b", "2");
        assert_eq!(res.header(cookie::SET_COOKIE), Some("a=1\nb=2"));
    }
}
