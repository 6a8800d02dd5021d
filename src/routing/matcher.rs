//! Primitive match tokens.
//!
//! # Token Kinds
//! - Literal: consume exactly this segment
//! - Capture: consume any non-empty segment, storing it under a name
//! - Always: match without touching the path
//! - Never: match nothing
//!
//! # Design Decisions
//! - Tokens borrow their text; a match tree builds them on the fly
//! - `false` maps to `Never` so a computed guard reads naturally in `on`

use crate::routing::cursor::PathCursor;
use crate::routing::inbox::Inbox;

/// A single guard evaluated against the path cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Literal(&'a str),
    Capture(&'a str),
    Always,
    Never,
}

/// Build a capture token for the next segment.
pub fn capture(name: &str) -> Token<'_> {
    Token::Capture(name)
}

impl<'a> From<&'a str> for Token<'a> {
    fn from(literal: &'a str) -> Self {
        Token::Literal(literal)
    }
}

impl<'a> From<&'a String> for Token<'a> {
    fn from(literal: &'a String) -> Self {
        Token::Literal(literal.as_str())
    }
}

impl From<bool> for Token<'static> {
    fn from(value: bool) -> Self {
        if value {
            Token::Always
        } else {
            Token::Never
        }
    }
}

impl Token<'_> {
    /// Evaluate the token, advancing `path` only on success.
    pub fn eval(self, path: &mut PathCursor, inbox: &mut Inbox) -> bool {
        match self {
            Token::Literal(literal) => path.consume(literal),
            Token::Capture(name) => path.capture(name, inbox).is_some(),
            Token::Always => true,
            Token::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_leaves_cursor_untouched() {
        let mut path = PathCursor::new("/a/b");
        let mut inbox = Inbox::new();
        let before = path.clone();

        for _ in 0..3 {
            assert!(Token::from(true).eval(&mut path, &mut inbox));
        }
        assert_eq!(path, before);
    }

    #[test]
    fn test_never_matches() {
        let mut path = PathCursor::new("/");
        let mut inbox = Inbox::new();
        assert!(!Token::from(false).eval(&mut path, &mut inbox));
        assert!(!Token::Never.eval(&mut path, &mut inbox));
    }

    #[test]
    fn test_literal_and_capture_dispatch_to_cursor() {
        let mut path = PathCursor::new("/users/42");
        let mut inbox = Inbox::new();

        assert!(Token::from("users").eval(&mut path, &mut inbox));
        assert!(capture("id").eval(&mut path, &mut inbox));
        assert_eq!(inbox.get_str("id"), Some("42"));
        assert!(!capture("extra").eval(&mut path, &mut inbox));
        assert!(path.is_root());
    }

    #[test]
    fn test_owned_string_literal() {
        let segment = String::from("docs");
        let mut path = PathCursor::new("/docs");
        let mut inbox = Inbox::new();
        assert!(Token::from(&segment).eval(&mut path, &mut inbox));
    }
}
