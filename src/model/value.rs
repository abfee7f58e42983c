//! Universal term type: every subject, predicate and object in the store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A term in the triple store.
///
/// Any `Value` that appears as the subject or object of a triple is a graph
/// node. The `Display` form is canonical: it is what node identity hashing
/// and cycle reports are built from.
///
/// - `Iri`: named resource, rendered `<name>`
/// - `BNode`: generated identifier, rendered `_:name`
/// - `String`, `Int`, `Bool`: literals
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Iri(String),
    BNode(String),
    String(String),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn iri(s: impl Into<String>) -> Self {
        Value::Iri(s.into())
    }

    pub fn bnode(s: impl Into<String>) -> Self {
        Value::BNode(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Iri(_) => "IRI",
            Value::BNode(_) => "BNODE",
            Value::String(_) => "STRING",
            Value::Int(_) => "INTEGER",
            Value::Bool(_) => "BOOLEAN",
        }
    }

    /// IRIs and blank nodes can be record identifiers; literals cannot.
    pub fn is_resource(&self) -> bool {
        matches!(self, Value::Iri(_) | Value::BNode(_))
    }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Iri(s) => write!(f, "<{s}>"),
            Value::BNode(s) => write!(f, "_:{s}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ============================================================================
// From conversions
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_owned()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Int(i) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}
