//! Ordered attribute maps.
//!
//! Attribute trees are keyed by entity and attribute names. Iteration order
//! is insertion order, which keeps container output diff-stable for a given
//! input tree.

use std::fmt;

use super::Node;

/// Insertion-ordered map from attribute name to [`Node`].
///
/// Entries are heap-allocated: `Node::Map` embeds an `AttrMap`, so the
/// storage must be an indirection for the recursive type to have a size.
/// `set` on an existing key replaces its value in place (last-write-wins).
#[derive(Clone, Default, PartialEq)]
pub struct AttrMap {
    entries: Vec<(String, Node)>,
}

impl AttrMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any existing entry with the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        let key = key.into();
        let value = value.into();

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Check if a key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl fmt::Debug for AttrMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl FromIterator<(String, Node)> for AttrMap {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_map_basic() {
        let mut map = AttrMap::new();
        map.set("name", "Housing");
        map.set("weight", 2.5);

        assert_eq!(map.get("name"), Some(&Node::Text("Housing".into())));
        assert_eq!(map.get("weight"), Some(&Node::Float(2.5)));
        assert_eq!(map.get("missing"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_attr_map_last_write_wins() {
        let mut map = AttrMap::new();
        map.set("rev", "A");
        map.set("rev", "B");

        assert_eq!(map.get("rev"), Some(&Node::Text("B".into())));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_attr_map_nests_recursively() {
        let mut inner = AttrMap::new();
        inner.set("leaf", 1i64);
        let mut middle = AttrMap::new();
        middle.set("inner", Node::Map(inner));
        let mut map = AttrMap::new();
        map.set("middle", Node::Map(middle));

        let middle = match map.get("middle") {
            Some(Node::Map(m)) => m,
            other => panic!("expected map, got {other:?}"),
        };
        let inner = match middle.get("inner") {
            Some(Node::Map(m)) => m,
            other => panic!("expected map, got {other:?}"),
        };
        assert_eq!(inner.get("leaf"), Some(&Node::Int(1)));
    }

    #[test]
    fn test_attr_map_preserves_insertion_order() {
        let mut map = AttrMap::new();
        map.set("z", 1i64);
        map.set("a", 2i64);
        map.set("m", 3i64);

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
