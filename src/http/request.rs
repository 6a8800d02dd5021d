//! Read-only request view.
//!
//! # Responsibilities
//! - Expose method, paths, headers and query to rule bodies
//! - Decode query and form parameters
//! - Parse request cookies
//!
//! # Design Decisions
//! - Borrowed from the environment; rules never mutate the request
//! - Form body parameters override query parameters of the same name

use std::collections::BTreeMap;

use http::{header, Method};
use url::form_urlencoded;

use crate::http::cookie::parse_cookie_header;
use crate::http::env::Env;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A borrowed view over the request environment.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    env: &'a Env,
}

impl<'a> Request<'a> {
    /// View over `env`.
    pub fn new(env: &'a Env) -> Self {
        Self { env }
    }

    /// Request method.
    pub fn method(&self) -> &'a Method {
        self.env.method()
    }

    /// Whether the method is `GET`.
    pub fn is_get(&self) -> bool {
        self.method() == Method::GET
    }

    /// Whether the method is `POST`.
    pub fn is_post(&self) -> bool {
        self.method() == Method::POST
    }

    /// Whether the method is `PUT`.
    pub fn is_put(&self) -> bool {
        self.method() == Method::PUT
    }

    /// Whether the method is `PATCH`.
    pub fn is_patch(&self) -> bool {
        self.method() == Method::PATCH
    }

    /// Whether the method is `DELETE`.
    pub fn is_delete(&self) -> bool {
        self.method() == Method::DELETE
    }

    /// Whether the method is `HEAD`.
    pub fn is_head(&self) -> bool {
        self.method() == Method::HEAD
    }

    /// Whether the method is `OPTIONS`.
    pub fn is_options(&self) -> bool {
        self.method() == Method::OPTIONS
    }

    /// Prefix consumed by outer dispatchers.
    pub fn script_name(&self) -> &'a str {
        self.env.script_name()
    }

    /// Path left for this dispatcher.
    pub fn path_info(&self) -> &'a str {
        self.env.path_info()
    }

    /// Full path: script name followed by path info.
    pub fn path(&self) -> String {
        format!("{}{}", self.script_name(), self.path_info())
    }

    /// Raw query string.
    pub fn query_string(&self) -> &'a str {
        self.env.query_string()
    }

    /// First value of a header, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&'a str> {
        self.env.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// `Content-Type` of the request body.
    pub fn content_type(&self) -> Option<&'a str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// Buffered request body.
    pub fn body(&self) -> &'a [u8] {
        self.env.body()
    }

    fn is_form(&self) -> bool {
        self.content_type()
            .map(|ct| ct.trim_start().starts_with(FORM_CONTENT_TYPE))
            .unwrap_or(false)
    }

    /// Query parameters merged with form body parameters.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> =
            form_urlencoded::parse(self.query_string().as_bytes())
                .into_owned()
                .collect();

        if self.is_form() {
            params.extend(form_urlencoded::parse(self.body()).into_owned());
        }
        params
    }

    pub fn param(&self, name: &str) -> Option<String> {
        self.params().remove(name)
    }

    pub fn cookies(&self) -> BTreeMap<String, String> {
        self.env
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(parse_cookie_header)
            .fold(BTreeMap::new(), |mut all, found| {
                for (name, value) in found {
                    all.entry(name).or_insert(value);
                }
                all
            })
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies().remove(name)
    }
}
