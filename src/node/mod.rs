//! Attribute tree model.
//!
//! A [`Node`] is one value in an extracted attribute tree: a nested mapping,
//! a sequence, or a scalar. The tree walker in [`crate::convert`] consumes
//! nodes and decides how each one lands in the container - nested mappings
//! become groups, everything else becomes a dataset.
//!
//! Sequences are classified before writing: a sequence whose elements all
//! share one primitive category gets a native array encoding, anything else
//! is opaque and is stored as its canonical JSON text.

mod attr_map;

pub use attr_map::AttrMap;

use serde_json::Value;

/// One value in an attribute tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Nested mapping of named children. Becomes a group.
    Map(AttrMap),
    /// Ordered sequence. Becomes a single dataset (array or text fallback).
    Seq(Vec<Node>),
    /// 64-bit signed integer scalar.
    Int(i64),
    /// 64-bit float scalar.
    Float(f64),
    /// Boolean scalar.
    Bool(bool),
    /// UTF-8 text scalar.
    Text(String),
    /// Absent value. Stored via the canonical-text fallback ("null").
    Null,
}

/// Primitive category of a homogeneous sequence, or `Opaque` when no single
/// native array encoding can hold it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqKind {
    /// All elements are integers.
    Int64,
    /// All elements are numeric, at least one is a float; ints are promoted.
    Float64,
    /// All elements are booleans.
    Bool,
    /// All elements are text.
    Text,
    /// Mixed categories, or elements that are themselves maps/sequences.
    Opaque,
}

impl Node {
    /// Build a map node from key-value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Node>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = AttrMap::new();
        for (k, v) in entries {
            map.set(k, v);
        }
        Node::Map(map)
    }

    /// Build a sequence node.
    pub fn seq<V: Into<Node>, I: IntoIterator<Item = V>>(items: I) -> Self {
        Node::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the node's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Map(_) => "map",
            Node::Seq(_) => "sequence",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::Bool(_) => "bool",
            Node::Text(_) => "text",
            Node::Null => "null",
        }
    }

    /// Classify a sequence by the primitive category of its elements.
    ///
    /// An empty sequence classifies as `Text` and lands as an empty string
    /// array. Integers and floats share the numeric category; booleans and
    /// text do not mix with anything.
    pub fn classify_seq(items: &[Node]) -> SeqKind {
        if items.is_empty() {
            return SeqKind::Text;
        }

        let mut ints = 0usize;
        let mut floats = 0usize;
        let mut bools = 0usize;
        let mut texts = 0usize;
        for item in items {
            match item {
                Node::Int(_) => ints += 1,
                Node::Float(_) => floats += 1,
                Node::Bool(_) => bools += 1,
                Node::Text(_) => texts += 1,
                _ => return SeqKind::Opaque,
            }
        }

        let n = items.len();
        if ints == n {
            SeqKind::Int64
        } else if ints + floats == n {
            SeqKind::Float64
        } else if bools == n {
            SeqKind::Bool
        } else if texts == n {
            SeqKind::Text
        } else {
            SeqKind::Opaque
        }
    }

    /// Canonical textual form of this node: compact JSON.
    ///
    /// This is the fallback representation for opaque sequences and
    /// unrecognized scalars. It round-trips through [`Node::from_json`],
    /// which is what makes the fallback verifiable, though numeric-vs-text
    /// fidelity on read-back is explicitly not guaranteed elsewhere.
    pub fn canonical_text(&self) -> String {
        self.to_json().to_string()
    }

    /// Convert to a JSON value.
    ///
    /// Non-finite floats have no JSON number form and fall back to their
    /// display text.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Node::Seq(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Int(v) => Value::from(*v),
            Node::Float(v) => match serde_json::Number::from_f64(*v) {
                Some(n) => Value::Number(n),
                None => Value::String(v.to_string()),
            },
            Node::Bool(v) => Value::Bool(*v),
            Node::Text(v) => Value::String(v.clone()),
            Node::Null => Value::Null,
        }
    }

    /// Convert from a JSON value.
    ///
    /// JSON numbers that fit an `i64` come back as `Int`, everything else
    /// numeric as `Float`. Object member order is preserved only if
    /// serde_json's `preserve_order` feature is active in the build; the
    /// converter itself never goes through this path.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(v) => Node::Bool(*v),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Node::Int(i)
                } else {
                    Node::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Node::Text(s.clone()),
            Value::Array(items) => Node::Seq(items.iter().map(Node::from_json).collect()),
            Value::Object(map) => Node::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Int(v)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::Text(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::Text(v)
    }
}

impl From<AttrMap> for Node {
    fn from(v: AttrMap) -> Self {
        Node::Map(v)
    }
}

impl From<Vec<Node>> for Node {
    fn from(v: Vec<Node>) -> Self {
        Node::Seq(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_homogeneous() {
        let ints = [Node::Int(1), Node::Int(2), Node::Int(3)];
        assert_eq!(Node::classify_seq(&ints), SeqKind::Int64);

        let mixed_numeric = [Node::Int(1), Node::Float(2.5)];
        assert_eq!(Node::classify_seq(&mixed_numeric), SeqKind::Float64);

        let bools = [Node::Bool(true), Node::Bool(false)];
        assert_eq!(Node::classify_seq(&bools), SeqKind::Bool);

        let texts = [Node::Text("item1".into()), Node::Text("item2".into())];
        assert_eq!(Node::classify_seq(&texts), SeqKind::Text);
    }

    #[test]
    fn test_classify_opaque() {
        // Bool does not mix with numeric
        let bool_and_int = [Node::Bool(true), Node::Int(1)];
        assert_eq!(Node::classify_seq(&bool_and_int), SeqKind::Opaque);

        let text_and_int = [Node::Text("a".into()), Node::Int(1)];
        assert_eq!(Node::classify_seq(&text_and_int), SeqKind::Opaque);

        let with_map = [Node::Int(1), Node::map([("x", 1i64)])];
        assert_eq!(Node::classify_seq(&with_map), SeqKind::Opaque);

        let nested_seq = [Node::seq([1i64, 2])];
        assert_eq!(Node::classify_seq(&nested_seq), SeqKind::Opaque);
    }

    #[test]
    fn test_classify_empty_is_text() {
        assert_eq!(Node::classify_seq(&[]), SeqKind::Text);
    }

    #[test]
    fn test_canonical_text_round_trip() {
        let node = Node::seq(vec![
            Node::Int(1),
            Node::Text("a".into()),
            Node::map([("x", 1i64)]),
        ]);
        let text = node.canonical_text();
        assert_eq!(text, r#"[1,"a",{"x":1}]"#);

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(Node::from_json(&parsed), node);
    }

    #[test]
    fn test_null_canonical_text() {
        assert_eq!(Node::Null.canonical_text(), "null");
    }

    #[test]
    fn test_non_finite_float_falls_back_to_text() {
        let json = Node::Float(f64::INFINITY).to_json();
        assert_eq!(json, Value::String("inf".to_string()));
    }
}
