//! Triple (directed, labelled edge) in the store.

use serde::{Deserialize, Serialize};
use super::Value;

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// subject → object
    Outgoing,
    /// object → subject
    Incoming,
    Both,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
            Direction::Both => Direction::Both,
        }
    }
}

/// A subject-predicate-object statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Value,
    pub predicate: Value,
    pub object: Value,
}

impl Triple {
    pub fn new(subject: impl Into<Value>, predicate: impl Into<Value>, object: impl Into<Value>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// The "other" end of the triple from the given node.
    pub fn other_node(&self, from: &Value) -> Option<&Value> {
        if *from == self.subject { Some(&self.object) }
        else if *from == self.object { Some(&self.subject) }
        else { None }
    }

    /// The end reached by walking this triple in `dir` starting at `from`.
    pub fn target(&self, from: &Value, dir: Direction) -> Option<&Value> {
        match dir {
            Direction::Outgoing if self.subject == *from => Some(&self.object),
            Direction::Incoming if self.object == *from => Some(&self.subject),
            Direction::Both => self.other_node(from),
            _ => None,
        }
    }
}
