//! Cookie header serialization and parsing.
//!
//! # Responsibilities
//! - Render `Set-Cookie` lines from a name and options
//! - Render expiring lines that clear a cookie
//! - Parse the request `Cookie` header
//!
//! # Design Decisions
//! - Names and values are form-url-encoded on the way out and decoded on
//!   the way in
//! - Several cookies share one header value separated by `\n`
//! - No signing or encryption happens here

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use url::form_urlencoded;

use crate::http::response::{stored_key, Headers};

pub const SET_COOKIE: &str = "Set-Cookie";

const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// `SameSite` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Value and attributes of a cookie to set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl CookieOptions {
    /// Options carrying only `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Restrict to `domain`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Restrict to `path`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Lifetime in seconds.
    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Absolute expiry, rendered as an HTTP date.
    pub fn expires(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(at);
        self
    }

    /// Send over HTTPS only.
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Hide from client scripts.
    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    /// Cross-site sending policy.
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }
}

impl From<&str> for CookieOptions {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CookieOptions {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

fn escape(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Render one `Set-Cookie` line.
pub fn serialize(name: &str, options: &CookieOptions) -> String {
    let expires = options
        .expires
        .map(|at| at.format("%a, %d %b %Y %H:%M:%S GMT").to_string());
    render(name, options, expires.as_deref())
}

fn render(name: &str, options: &CookieOptions, expires: Option<&str>) -> String {
    let mut line = format!("{}={}", escape(name), escape(&options.value));

    if let Some(domain) = &options.domain {
        line.push_str("; domain=");
        line.push_str(domain);
    }
    if let Some(path) = &options.path {
        line.push_str("; path=");
        line.push_str(path);
    }
    if let Some(max_age) = options.max_age {
        line.push_str(&format!("; max-age={}", max_age));
    }
    if let Some(expires) = expires {
        line.push_str("; expires=");
        line.push_str(expires);
    }
    if options.secure {
        line.push_str("; secure");
    }
    if options.http_only {
        line.push_str("; HttpOnly");
    }
    if let Some(same_site) = options.same_site {
        line.push_str("; SameSite=");
        line.push_str(same_site.as_str());
    }

    line
}

/// Append a cookie line to the `Set-Cookie` header.
pub fn append_set_cookie(headers: &mut Headers, name: &str, options: &CookieOptions) {
    append_line(headers, serialize(name, options));
}

/// Drop pending lines for `name` and append one that expires it.
///
/// Pending lines are narrowed by domain when one is given, otherwise by
/// path when one is given.
pub fn append_delete_cookie(headers: &mut Headers, name: &str, options: &CookieOptions) {
    let prefix = format!("{}=", escape(name));
    let scope = match (&options.domain, &options.path) {
        (Some(domain), _) => Some(("domain", domain.as_str())),
        (None, Some(path)) => Some(("path", path.as_str())),
        (None, None) => None,
    };

    if let Some(key) = stored_key(headers, SET_COOKIE).cloned() {
        let existing = headers.remove(&key).unwrap_or_default();
        let kept: Vec<&str> = existing
            .lines()
            .filter(|line| {
                let same_name = line.starts_with(&prefix);
                let same_scope =
                    scope.map_or(true, |(attr, value)| has_attribute(line, attr, value));
                !(same_name && same_scope)
            })
            .collect();
        if !kept.is_empty() {
            headers.insert(key, kept.join("\n"));
        }
    }

    let expired = CookieOptions {
        value: String::new(),
        max_age: Some(0),
        ..options.clone()
    };
    append_line(headers, render(name, &expired, Some(EPOCH_EXPIRES)));
}

/// Whether `line` carries exactly `attr=value` after its name-value pair.
fn has_attribute(line: &str, attr: &str, value: &str) -> bool {
    line.split(';').skip(1).any(|part| {
        part.trim()
            .split_once('=')
            .is_some_and(|(k, v)| k.eq_ignore_ascii_case(attr) && v == value)
    })
}

fn append_line(headers: &mut Headers, line: String) {
    match stored_key(headers, SET_COOKIE).cloned() {
        Some(key) => {
            let existing = headers.entry(key).or_default();
            if !existing.is_empty() {
                existing.push('\n');
            }
            existing.push_str(&line);
        }
        None => {
            headers.insert(SET_COOKIE.to_string(), line);
        }
    }
}

/// Parse a `Cookie` request header. The first occurrence of a name wins.
pub fn parse_cookie_header(header: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pair in header.split([';', ',']) {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((name, value)) = form_urlencoded::parse(pair.as_bytes()).next() {
            cookies
                .entry(name.into_owned())
                .or_insert_with(|| value.into_owned());
        }
    }
    cookies
}
