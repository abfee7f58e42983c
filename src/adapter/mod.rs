//! # Directed-Graph Adapter
//!
//! Presents any adjacency rule over the store as a directed graph that graph
//! algorithms can consume. Nothing about the graph's shape is cached: every
//! query is evaluated against the live store when it is made.
//!
//! ```text
//! Directed { graph, rule } ── nodes()          ─▶ every node in the store
//!                          ── out_neighbors(k) ─▶ rule from node(k)
//!                          ── in_neighbors(k)  ─▶ rule.reverse() from node(k)
//!                          ── has_edge(a, b)   ─▶ rule from node(a), is node(b)
//! ```
//!
//! ## Node identity
//!
//! Algorithms address nodes by [`NodeKey`], a 64-bit hash of the node's
//! canonical string form. The mapping is lossy: two distinct values with
//! the same key are the same graph node as far as the adapter is concerned,
//! and `node(key)` returns whichever of them the store listed first.
//!
//! ## Failure semantics
//!
//! The algorithm-facing interface has no error channel. Store errors are
//! logged with `warn!` and read as "no nodes" / "no edge". In particular
//! `has_edge_between` still checks the second direction after the first one
//! failed.

mod visit;

use std::hash::{DefaultHasher, Hash, Hasher};

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use tracing::warn;

use crate::context::Context;
use crate::model::Value;
use crate::storage::StorageBackend;
use crate::traversal::{Query, Traversal};
use crate::Graph;

pub use visit::{cycles, Visited};

// ============================================================================
// Identity
// ============================================================================

/// Hashed node identity.
///
/// A SipHash of the value's canonical form. Keys are deterministic within
/// one build of the crate, which is as long as petgraph holds them; they
/// are not meant to be persisted, since std's hasher may change between
/// Rust releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    pub fn of(value: &Value) -> Self {
        NodeKey(siphash_string(&value.to_string()))
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn siphash_string(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

/// An edge carries nothing beyond its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: NodeKey,
    pub to: NodeKey,
}

// ============================================================================
// Directed
// ============================================================================

/// Directed-graph view of `graph` under an adjacency rule.
pub struct Directed<'g, B: StorageBackend> {
    graph: &'g Graph<B>,
    ctx: Context,
    rule: Traversal,
    reverse: Traversal,
    /// key → first value seen with that key
    memo: Mutex<HashMap<NodeKey, Value>>,
}

impl<'g, B: StorageBackend> Directed<'g, B> {
    /// `rule` describes one step from a node to each of its out-neighbors.
    pub fn new(graph: &'g Graph<B>, ctx: Context, rule: Traversal) -> Self {
        let reverse = rule.reverse();
        Self {
            graph,
            ctx,
            rule,
            reverse,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// All nodes in the store.
    pub fn nodes(&self) -> NodeSeq<'_, 'g, B> {
        NodeSeq { directed: self, source: Source::All }
    }

    /// The node whose key is `key`, if the store has one.
    ///
    /// Unseen keys cost one scan of the store; every node met on the way is
    /// remembered, so repeated lookups are O(1).
    pub fn node(&self, key: NodeKey) -> Option<Value> {
        if let Some(v) = self.memo.lock().get(&key) {
            return Some(v.clone());
        }
        let all = self.fetch(&Source::All);
        let mut memo = self.memo.lock();
        for v in all {
            memo.entry(NodeKey::of(&v)).or_insert(v);
        }
        memo.get(&key).cloned()
    }

    pub fn out_neighbors(&self, key: NodeKey) -> NodeSeq<'_, 'g, B> {
        self.follow(key, &self.rule)
    }

    pub fn in_neighbors(&self, key: NodeKey) -> NodeSeq<'_, 'g, B> {
        self.follow(key, &self.reverse)
    }

    /// True iff the rule steps from `from` to `to`.
    pub fn has_edge(&self, from: NodeKey, to: NodeKey) -> bool {
        let (Some(u), Some(v)) = (self.node(from), self.node(to)) else {
            return false;
        };
        let query = Query::from_nodes([u]).follow(&self.rule).follow(&Traversal::new().is([v]));
        match self.graph.evaluate(&self.ctx, &query) {
            Ok(nodes) => !nodes.is_empty(),
            Err(e) => {
                warn!(from = %from, to = %to, error = %e, "edge query failed, treating as no edge");
                false
            }
        }
    }

    /// Edge in either direction.
    pub fn has_edge_between(&self, a: NodeKey, b: NodeKey) -> bool {
        self.has_edge(a, b) || self.has_edge(b, a)
    }

    pub fn edge(&self, from: NodeKey, to: NodeKey) -> Option<Edge> {
        self.has_edge(from, to).then_some(Edge { from, to })
    }

    fn follow(&self, key: NodeKey, rule: &Traversal) -> NodeSeq<'_, 'g, B> {
        let source = match self.node(key) {
            Some(node) => Source::Follow { node, rule: rule.clone() },
            None => Source::Empty,
        };
        NodeSeq { directed: self, source }
    }

    fn fetch(&self, source: &Source) -> Vec<Value> {
        let query = match source {
            Source::Empty => return Vec::new(),
            Source::All => Query::all(),
            Source::Follow { node, rule } => Query::from_nodes([node.clone()]).follow(rule),
        };
        match self.graph.evaluate(&self.ctx, &query) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(traversal = %query.traversal, error = %e, "node query failed, yielding no nodes");
                Vec::new()
            }
        }
    }
}

// ============================================================================
// NodeSeq
// ============================================================================

#[derive(Debug, Clone)]
enum Source {
    Empty,
    All,
    Follow { node: Value, rule: Traversal },
}

/// A restartable, lazily evaluated node sequence.
///
/// Nothing is read until iteration starts, and every new iteration queries
/// the store again.
pub struct NodeSeq<'d, 'g, B: StorageBackend> {
    directed: &'d Directed<'g, B>,
    source: Source,
}

impl<B: StorageBackend> Clone for NodeSeq<'_, '_, B> {
    fn clone(&self) -> Self {
        NodeSeq { directed: self.directed, source: self.source.clone() }
    }
}

impl<B: StorageBackend> NodeSeq<'_, '_, B> {
    pub fn iter(&self) -> std::vec::IntoIter<Value> {
        self.directed.fetch(&self.source).into_iter()
    }

    /// Distinct keys, in store order.
    pub fn keys(&self) -> Vec<NodeKey> {
        let mut seen = HashSet::new();
        self.iter()
            .map(|v| NodeKey::of(&v))
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// Counts by evaluating.
    pub fn len(&self) -> usize {
        self.iter().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<B: StorageBackend> IntoIterator for &NodeSeq<'_, '_, B> {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<B: StorageBackend> IntoIterator for NodeSeq<'_, '_, B> {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelToken;
    use crate::model::Triple;
    use crate::storage::MemoryBackend;

    fn n(s: &str) -> Value {
        Value::from(s)
    }

    fn graph(edges: &[(&str, &str)]) -> Graph<MemoryBackend> {
        let g = Graph::open_memory();
        let triples: Vec<Triple> = edges
            .iter()
            .map(|(a, b)| Triple::new(n(a), Value::iri("next"), n(b)))
            .collect();
        g.add_triples(&Context::background(), &triples).unwrap();
        g
    }

    fn key(s: &str) -> NodeKey {
        NodeKey::of(&n(s))
    }

    #[test]
    fn test_node_count() {
        let g = graph(&[("1", "2"), ("2", "3")]);
        let d = Directed::new(&g, Context::background(), Traversal::new().out_any());
        assert_eq!(d.nodes().len(), 3);
    }

    #[test]
    fn test_node_resolves_key() {
        let g = graph(&[("1", "2")]);
        let d = Directed::new(&g, Context::background(), Traversal::new().out_any());
        assert_eq!(d.node(key("1")), Some(n("1")));
        assert_eq!(d.node(key("2")), Some(n("2")));
        assert_eq!(d.node(key("7")), None);
        assert_eq!(NodeKey::of(&d.node(key("1")).unwrap()), key("1"));
    }

    #[test]
    fn test_node_key_follows_canonical_form() {
        assert_eq!(NodeKey::of(&Value::iri("a")), NodeKey::of(&Value::iri("a")));
        // same text, different term kind
        assert_ne!(NodeKey::of(&Value::iri("a")), NodeKey::of(&Value::from("a")));
        assert_ne!(NodeKey::of(&Value::Int(1)), NodeKey::of(&Value::from("1")));
    }

    #[test]
    fn test_neighbors() {
        let g = graph(&[("1", "2"), ("2", "3")]);
        let d = Directed::new(&g, Context::background(), Traversal::new().out_any());

        let out: Vec<Value> = d.out_neighbors(key("1")).into_iter().collect();
        assert_eq!(out, vec![n("2")]);
        let inn: Vec<Value> = d.in_neighbors(key("3")).into_iter().collect();
        assert_eq!(inn, vec![n("2")]);
        assert!(d.out_neighbors(key("missing")).is_empty());
        assert!(d.in_neighbors(key("1")).is_empty());
    }

    #[test]
    fn test_has_edge() {
        let g = graph(&[("1", "2"), ("2", "3")]);
        let d = Directed::new(&g, Context::background(), Traversal::new().out_any());
        assert!(d.has_edge(key("1"), key("2")));
        assert!(!d.has_edge(key("2"), key("1")));
        assert!(!d.has_edge(key("1"), key("3")));
        assert!(d.has_edge_between(key("2"), key("1")));
        assert!(!d.has_edge_between(key("1"), key("3")));
        assert_eq!(d.edge(key("1"), key("2")), Some(Edge { from: key("1"), to: key("2") }));
        assert_eq!(d.edge(key("1"), key("3")), None);
    }

    #[test]
    fn test_sequences_are_live() {
        let g = graph(&[("1", "2")]);
        let d = Directed::new(&g, Context::background(), Traversal::new().out_any());
        let out = d.out_neighbors(key("1"));
        assert_eq!(out.len(), 1);

        g.add_triples(&Context::background(), &[Triple::new(n("1"), Value::iri("next"), n("5"))]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(d.nodes().len(), 3);
    }

    #[test]
    fn test_store_errors_read_as_empty() {
        let g = graph(&[("1", "2")]);
        let (k1, k2) = (key("1"), key("2"));
        let token = CancelToken::new();
        let d = Directed::new(&g, Context::with_cancel(token.clone()), Traversal::new().out_any());
        // memoized before cancellation, so only the edge query itself fails
        assert!(d.node(k1).is_some());
        token.cancel();

        assert!(d.nodes().is_empty());
        assert!(!d.has_edge(k1, k2));
        assert!(!d.has_edge_between(k1, k2));
        assert!(d.out_neighbors(k1).is_empty());
        assert_eq!(d.node(k2), Some(n("2")));
    }
}
