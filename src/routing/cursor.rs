//! Segment-by-segment path consumption.
//!
//! # Responsibilities
//! - Track the consumed prefix and the unconsumed suffix of a request path
//! - Consume literal segments and capture arbitrary ones
//! - Report whether the current nesting level has reached its root
//!
//! # Design Decisions
//! - A single byte offset splits the path, so `prev() + curr()` is always
//!   the original path
//! - Every operation checks the whole match before moving the offset; a
//!   failed match never advances partially
//! - Captured segments are percent-decoded; `+` is left alone because it is
//!   only a space in form bodies, not in paths

use serde_json::Value;

use crate::routing::inbox::Inbox;

const SEPARATOR: char = '/';

/// Cursor over a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCursor {
    path: String,
    pos: usize,
}

impl PathCursor {
    /// Create a cursor positioned at the start of `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pos: 0,
        }
    }

    /// The unconsumed suffix of the path.
    pub fn curr(&self) -> &str {
        &self.path[self.pos..]
    }

    /// The prefix matched so far.
    pub fn prev(&self) -> &str {
        &self.path[..self.pos]
    }

    /// True when nothing but an optional trailing separator remains.
    pub fn is_root(&self) -> bool {
        let curr = self.curr();
        curr.is_empty() || curr == "/"
    }

    /// Consume `literal` if it is exactly the next segment (or run of
    /// segments).
    ///
    /// `"use"` does not consume `"/users"`: the literal must end at a
    /// separator or at the end of the path.
    pub fn consume(&mut self, literal: &str) -> bool {
        let Some(rest) = self.curr().strip_prefix(SEPARATOR) else {
            return false;
        };
        let Some(after) = rest.strip_prefix(literal) else {
            return false;
        };
        if !(after.is_empty() || after.starts_with(SEPARATOR)) {
            return false;
        }

        self.pos += SEPARATOR.len_utf8() + literal.len();
        true
    }

    /// Capture the next non-empty segment into `store` under `name`.
    ///
    /// Returns the decoded value, or `None` (without moving) when the path
    /// is exhausted or the next segment is empty.
    pub fn capture(&mut self, name: &str, store: &mut Inbox) -> Option<String> {
        let value = self.extract()?;
        store.insert(name, Value::String(value.clone()));
        Some(value)
    }

    /// Consume and return the next non-empty segment without storing it.
    pub fn extract(&mut self) -> Option<String> {
        let rest = self.curr().strip_prefix(SEPARATOR)?;
        let len = rest.find(SEPARATOR).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }

        let value = decode_segment(&rest[..len]);
        self.pos += SEPARATOR.len_utf8() + len;
        Some(value)
    }

    /// Hand back `literal` if it is the last segment consumed.
    pub fn retract(&mut self, literal: &str) -> bool {
        let Some(before) = self.prev().strip_suffix(literal) else {
            return false;
        };
        if !before.ends_with(SEPARATOR) {
            return false;
        }

        self.pos -= SEPARATOR.len_utf8() + literal.len();
        true
    }
}

fn decode_segment(raw: &str) -> String {
    let bytes = urlencoding::decode_binary(raw.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_full_segment() {
        let mut cursor = PathCursor::new("/users/42");
        assert!(cursor.consume("users"));
        assert_eq!(cursor.prev(), "/users");
        assert_eq!(cursor.curr(), "/42");
    }

    #[test]
    fn test_consume_rejects_partial_segment() {
        let mut cursor = PathCursor::new("/users");
        assert!(!cursor.consume("use"));
        assert_eq!(cursor.prev(), "");
        assert_eq!(cursor.curr(), "/users");
    }

    #[test]
    fn test_consume_multi_segment_literal() {
        let mut cursor = PathCursor::new("/api/v1/items");
        assert!(cursor.consume("api/v1"));
        assert_eq!(cursor.curr(), "/items");

        let mut cursor = PathCursor::new("/api/v10");
        assert!(!cursor.consume("api/v1"));
        assert_eq!(cursor.curr(), "/api/v10");
    }

    #[test]
    fn test_consume_needs_leading_separator() {
        let mut cursor = PathCursor::new("users");
        assert!(!cursor.consume("users"));
        assert_eq!(cursor.curr(), "users");
    }

    #[test]
    fn test_capture_decodes_and_stores() {
        let mut cursor = PathCursor::new("/john%20doe/posts");
        let mut inbox = Inbox::new();

        let value = cursor.capture("name", &mut inbox);
        assert_eq!(value.as_deref(), Some("john doe"));
        assert_eq!(inbox.get_str("name"), Some("john doe"));
        assert_eq!(cursor.prev(), "/john%20doe");
        assert_eq!(cursor.curr(), "/posts");
    }

    #[test]
    fn test_capture_keeps_plus_sign() {
        let mut cursor = PathCursor::new("/a+b");
        let mut inbox = Inbox::new();
        assert_eq!(cursor.capture("q", &mut inbox).as_deref(), Some("a+b"));
    }

    #[test]
    fn test_capture_fails_on_empty_or_missing_segment() {
        let mut inbox = Inbox::new();

        for path in ["", "/", "//x"] {
            let mut cursor = PathCursor::new(path);
            assert_eq!(cursor.capture("id", &mut inbox), None);
            assert_eq!(cursor.curr(), path);
            assert_eq!(cursor.prev(), "");
        }
        assert!(inbox.is_empty());
    }

    #[test]
    fn test_root_detection() {
        assert!(PathCursor::new("").is_root());
        assert!(PathCursor::new("/").is_root());
        assert!(!PathCursor::new("/a").is_root());

        let mut cursor = PathCursor::new("/a/");
        assert!(cursor.consume("a"));
        assert!(cursor.is_root());
    }

    #[test]
    fn test_prev_and_curr_always_rebuild_path() {
        let path = "/shop/items/7/reviews";
        let mut cursor = PathCursor::new(path);
        let mut inbox = Inbox::new();

        cursor.consume("shop");
        cursor.consume("nope");
        cursor.consume("items");
        cursor.capture("id", &mut inbox);
        cursor.consume("review");

        assert_eq!(format!("{}{}", cursor.prev(), cursor.curr()), path);
        assert_eq!(cursor.curr(), "/reviews");
    }

    #[test]
    fn test_retract_last_segment() {
        let mut cursor = PathCursor::new("/admin/users");
        assert!(cursor.consume("admin"));
        assert!(!cursor.retract("min"));
        assert!(cursor.retract("admin"));
        assert_eq!(cursor.curr(), "/admin/users");
    }

    #[test]
    fn test_extract_does_not_store() {
        let mut cursor = PathCursor::new("/v2/status");
        assert_eq!(cursor.extract().as_deref(), Some("v2"));
        assert_eq!(cursor.curr(), "/status");
    }
}
