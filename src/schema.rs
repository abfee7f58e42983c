//! Typed records ↔ triples.
//!
//! A record is a resource identifier plus a set of outgoing triples. Writing
//! a record is one `StorageBackend::insert` call; reading it back decodes the
//! node's outgoing triples through [`Fields`].

use crate::model::{Triple, Value};
use crate::{Error, Result};

/// Predicate used to tag a record with a type.
pub const RDF_TYPE: &str = "rdf:type";

/// A type that can be stored as, and loaded from, triples.
pub trait Record: Sized {
    /// The resource this record describes.
    fn id(&self) -> &Value;

    /// All triples needed to describe the record.
    fn to_triples(&self) -> Vec<Triple>;

    /// Decode from the outgoing triples of `id`.
    fn from_triples(id: Value, triples: &[Triple]) -> Result<Self>;
}

/// Read-only view over a node's outgoing triples.
pub struct Fields<'a> {
    id: &'a Value,
    triples: &'a [Triple],
}

impl<'a> Fields<'a> {
    pub fn new(id: &'a Value, triples: &'a [Triple]) -> Self {
        Self { id, triples }
    }

    /// First object of `predicate`, if any.
    pub fn get(&self, predicate: &str) -> Option<&'a Value> {
        self.triples
            .iter()
            .find(|t| t.subject == *self.id && matches!(&t.predicate, Value::Iri(p) if p == predicate))
            .map(|t| &t.object)
    }

    /// Required string field.
    pub fn string(&self, predicate: &str) -> Result<String> {
        let value = self.get(predicate)
            .ok_or_else(|| Error::SchemaError(format!("{}: missing field {predicate}", self.id)))?;
        value.as_str().map(str::to_owned).ok_or_else(|| Error::SchemaError(format!(
            "{}: field {predicate} expected STRING, got {}", self.id, value.type_name()
        )))
    }

    /// Optional reference to another resource.
    pub fn reference(&self, predicate: &str) -> Result<Option<Value>> {
        match self.get(predicate) {
            None => Ok(None),
            Some(v) if v.is_resource() => Ok(Some(v.clone())),
            Some(v) => Err(Error::SchemaError(format!(
                "{}: field {predicate} expected a resource, got {}", self.id, v.type_name()
            ))),
        }
    }

    /// Whether the node is tagged `rdf:type <type_iri>`.
    pub fn has_type(&self, type_iri: &str) -> bool {
        self.triples.iter().any(|t| {
            t.subject == *self.id
                && matches!(&t.predicate, Value::Iri(p) if p == RDF_TYPE)
                && matches!(&t.object, Value::Iri(o) if o == type_iri)
        })
    }
}
