//! Values handed from one match level to the next.
//!
//! Captures land here, and `run` forwards a chosen inbox to a nested
//! dispatcher. Values are JSON so a rule can stash anything serializable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String-keyed map of arbitrary values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inbox(Map<String, Value>);

impl Inbox {
    /// Empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a value only if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove and return the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Inbox
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_typed_get() {
        let mut inbox = Inbox::new();
        assert_eq!(inbox.insert("id", "42"), None);
        inbox.insert("limit", 10);

        assert_eq!(inbox.get_str("id"), Some("42"));
        assert_eq!(inbox.get_str("limit"), None);
        assert_eq!(inbox.get("limit"), Some(&json!(10)));
        assert_eq!(inbox.len(), 2);
    }

    #[test]
    fn test_collect_and_serialize_flat() {
        let inbox: Inbox = [("user", "ana"), ("role", "admin")].into_iter().collect();
        let encoded = serde_json::to_value(&inbox).unwrap();
        assert_eq!(encoded, json!({"user": "ana", "role": "admin"}));
    }
}
