//! # Traversal Expressions
//!
//! A [`Traversal`] is an immutable, composable description of a graph walk.
//! It owns no store handle and no seeds: it is pure data that any
//! `StorageBackend` can evaluate, any number of times, from any seed set.
//!
//! ```text
//! Query { seeds, traversal } ──evaluate──▶ ordered, de-duplicated nodes
//! ```
//!
//! Every step has a defined reverse, so every traversal does too: if `A`
//! reaches `B` via `t`, then `B` reaches `A` via `t.reverse()`. The
//! directed-graph adapter relies on this for in-neighbor queries, and the
//! filesystem model uses it to walk from a node towards the root.

pub mod eval;

use std::fmt;

use smallvec::SmallVec;

use crate::model::{Direction, Value};
use crate::storage::ExpandDepth;

pub use eval::evaluate;

// ============================================================================
// Step
// ============================================================================

/// One primitive step of a traversal.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Follow triples in `dir`, restricted to `predicate` (any if `None`).
    Expand { dir: Direction, predicate: Option<Value> },
    /// Keep nodes that have an outgoing `predicate` triple to one of `values`.
    Has { predicate: Value, values: Vec<Value> },
    /// Keep nodes that are one of the listed values.
    Is(Vec<Value>),
    /// Repeat `body` breadth-first, emitting newly reached nodes.
    Recursive { body: Box<Traversal>, depth: ExpandDepth },
}

impl Step {
    pub fn reverse(&self) -> Step {
        match self {
            Step::Expand { dir, predicate } => Step::Expand {
                dir: dir.reverse(),
                predicate: predicate.clone(),
            },
            Step::Has { .. } | Step::Is(_) => self.clone(),
            Step::Recursive { body, depth } => Step::Recursive {
                body: Box::new(body.reverse()),
                depth: *depth,
            },
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Expand { dir, predicate } => {
                let name = match dir {
                    Direction::Outgoing => "out",
                    Direction::Incoming => "in",
                    Direction::Both => "both",
                };
                match predicate {
                    Some(p) => write!(f, "{name}({p})"),
                    None => write!(f, "{name}()"),
                }
            }
            Step::Has { predicate, values } => {
                write!(f, "has({predicate}")?;
                for v in values {
                    write!(f, ", {v}")?;
                }
                write!(f, ")")
            }
            Step::Is(values) => {
                write!(f, "is(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Step::Recursive { body, depth } => write!(f, "recursive({body}, {depth:?})"),
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// A left-to-right composition of steps. The empty traversal is identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Traversal {
    steps: SmallVec<[Step; 4]>,
}

impl Traversal {
    /// The identity traversal: yields its seeds unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// subject → object along `predicate`.
    pub fn out(self, predicate: Value) -> Self {
        self.step(Step::Expand { dir: Direction::Outgoing, predicate: Some(predicate) })
    }

    /// subject → object along any predicate.
    pub fn out_any(self) -> Self {
        self.step(Step::Expand { dir: Direction::Outgoing, predicate: None })
    }

    /// object → subject along `predicate`.
    pub fn incoming(self, predicate: Value) -> Self {
        self.step(Step::Expand { dir: Direction::Incoming, predicate: Some(predicate) })
    }

    /// object → subject along any predicate.
    pub fn incoming_any(self) -> Self {
        self.step(Step::Expand { dir: Direction::Incoming, predicate: None })
    }

    pub fn has(self, predicate: Value, values: impl IntoIterator<Item = Value>) -> Self {
        self.step(Step::Has { predicate, values: values.into_iter().collect() })
    }

    pub fn is(self, values: impl IntoIterator<Item = Value>) -> Self {
        self.step(Step::Is(values.into_iter().collect()))
    }

    pub fn recursive(self, body: Traversal, depth: ExpandDepth) -> Self {
        self.step(Step::Recursive { body: Box::new(body), depth })
    }

    /// Append all steps of `other` after the steps of `self`.
    pub fn follow(mut self, other: &Traversal) -> Self {
        self.steps.extend(other.steps.iter().cloned());
        self
    }

    /// The inverse relation: steps in reverse order, each step reversed.
    pub fn reverse(&self) -> Traversal {
        Traversal {
            steps: self.steps.iter().rev().map(Step::reverse).collect(),
        }
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "identity");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Query
// ============================================================================

/// A traversal bound to a seed set.
///
/// An empty seed set is *unconstrained*: evaluation starts from every node
/// in the store. Callers that mean "no starting points" must not build a
/// `Query` at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub seeds: Vec<Value>,
    pub traversal: Traversal,
}

impl Query {
    /// Start from every node in the store.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_nodes(seeds: impl IntoIterator<Item = Value>) -> Self {
        Self { seeds: seeds.into_iter().collect(), traversal: Traversal::new() }
    }

    pub fn follow(mut self, traversal: &Traversal) -> Self {
        self.traversal = self.traversal.follow(traversal);
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.seeds.is_empty()
    }
}
