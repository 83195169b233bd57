//! Persistent JSON-shaped node.
//!
//! Containers sit behind `Arc`, so cloning a node is shallow and a
//! path-scoped update only reallocates the containers along that path.
//! Untouched siblings keep their identity, which `Node::same_ref` exposes
//! for cheap change detection.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::sync::Arc;

use super::path::PathToken;

/// Insertion-ordered mapping; documents keep the key order they were read with.
pub type Map = IndexMap<String, Node>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Seq(Arc<Vec<Node>>),
    Map(Arc<Map>),
}

impl Node {
    pub fn seq(items: Vec<Node>) -> Self {
        Node::Seq(Arc::new(items))
    }

    pub fn map(entries: Map) -> Self {
        Node::Map(Arc::new(entries))
    }

    pub fn from_f64(value: f64) -> Self {
        Number::from_f64(value).map(Node::Number).unwrap_or(Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(map) => Some(map.as_ref()),
            _ => None,
        }
    }

    /// Field lookup on a mapping node.
    pub fn get_key(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// One dereference step. Absent keys, out-of-range indices and scalar
    /// parents all yield `None`.
    pub fn child(&self, token: &PathToken) -> Option<&Node> {
        match (self, token) {
            (Node::Map(map), PathToken::Key(key)) => map.get(key.as_str()),
            (Node::Seq(items), PathToken::Index(idx)) => items.get(*idx),
            _ => None,
        }
    }

    /// True when both nodes are the same shared container allocation.
    /// Scalars never share identity.
    pub fn same_ref(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Seq(a), Node::Seq(b)) => Arc::ptr_eq(a, b),
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Copy with no allocation shared with `self`.
    pub fn deep_clone(&self) -> Node {
        match self {
            Node::Seq(items) => Node::seq(items.iter().map(Node::deep_clone).collect()),
            Node::Map(map) => Node::map(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.deep_clone()))
                    .collect(),
            ),
            scalar => scalar.clone(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Seq(_) => "sequence",
            Node::Map(_) => "mapping",
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::seq(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => Node::map(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Seq(items) => Value::Array(items.iter().map(Value::from).collect()),
            Node::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::from_f64(value)
    }
}

impl From<u64> for Node {
    fn from(value: u64) -> Self {
        Node::Number(Number::from(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map.iter() {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

// serde_json is built with `preserve_order`, so going through `Value` keeps
// the key order of the source text.
impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}
