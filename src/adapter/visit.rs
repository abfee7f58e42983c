//! petgraph visitor traits for [`Directed`], and cycle detection on top.
//!
//! `&Directed` is the graph handle algorithms take, the same way they take
//! `&DiGraph`:
//!
//! ```rust,no_run
//! use mobius::{Context, Directed, Graph, Traversal};
//! use petgraph::algo::is_cyclic_directed;
//!
//! let graph = Graph::open_memory();
//! let deps = Directed::new(&graph, Context::background(), Traversal::new().out_any());
//! let cyclic = is_cyclic_directed(&deps);
//! # let _ = cyclic;
//! ```

use hashbrown::HashSet;
use petgraph::algo::kosaraju_scc;
use petgraph::visit::{
    GraphBase, IntoNeighbors, IntoNeighborsDirected, IntoNodeIdentifiers, NodeCount, VisitMap, Visitable,
};

use super::{Directed, Edge, NodeKey};
use crate::model::Value;
use crate::storage::StorageBackend;

impl<B: StorageBackend> GraphBase for Directed<'_, B> {
    type NodeId = NodeKey;
    type EdgeId = Edge;
}

/// Visited set for petgraph's walkers.
#[derive(Debug, Clone, Default)]
pub struct Visited(HashSet<NodeKey>);

impl VisitMap<NodeKey> for Visited {
    fn visit(&mut self, key: NodeKey) -> bool {
        self.0.insert(key)
    }

    fn is_visited(&self, key: &NodeKey) -> bool {
        self.0.contains(key)
    }
}

impl<B: StorageBackend> Visitable for Directed<'_, B> {
    type Map = Visited;

    fn visit_map(&self) -> Self::Map {
        Visited::default()
    }

    fn reset_map(&self, map: &mut Self::Map) {
        map.0.clear();
    }
}

impl<B: StorageBackend> NodeCount for Directed<'_, B> {
    fn node_count(&self) -> usize {
        self.nodes().keys().len()
    }
}

impl<'a, B: StorageBackend> IntoNeighbors for &'a Directed<'_, B> {
    type Neighbors = std::vec::IntoIter<NodeKey>;

    fn neighbors(self, a: NodeKey) -> Self::Neighbors {
        self.out_neighbors(a).keys().into_iter()
    }
}

impl<'a, B: StorageBackend> IntoNeighborsDirected for &'a Directed<'_, B> {
    type NeighborsDirected = std::vec::IntoIter<NodeKey>;

    fn neighbors_directed(self, n: NodeKey, d: petgraph::Direction) -> Self::NeighborsDirected {
        let seq = match d {
            petgraph::Direction::Outgoing => self.out_neighbors(n),
            petgraph::Direction::Incoming => self.in_neighbors(n),
        };
        seq.keys().into_iter()
    }
}

impl<'a, B: StorageBackend> IntoNodeIdentifiers for &'a Directed<'_, B> {
    type NodeIdentifiers = std::vec::IntoIter<NodeKey>;

    fn node_identifiers(self) -> Self::NodeIdentifiers {
        self.nodes().keys().into_iter()
    }
}

/// Every cycle in `graph`.
///
/// Each entry is one strongly connected component with more than one node,
/// or a single node with an edge to itself, sorted by canonical string form.
/// Entries are sorted too.
pub fn cycles<B: StorageBackend>(graph: &Directed<'_, B>) -> Vec<Vec<Value>> {
    let mut cycles: Vec<Vec<Value>> = kosaraju_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || component.first().is_some_and(|k| graph.has_edge(*k, *k))
        })
        .map(|component| {
            let mut nodes: Vec<Value> = component.into_iter().filter_map(|k| graph.node(k)).collect();
            nodes.sort_unstable_by_key(|v| v.to_string());
            nodes
        })
        .collect();

    cycles.sort_unstable_by_key(|c| c.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    cycles
}
