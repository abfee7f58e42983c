//! In-memory storage backend.
//!
//! This is the reference implementation of `StorageBackend`.
//! It keeps one triple table plus subject/object indexes behind a single
//! `RwLock`, so every `insert` call is atomic with respect to readers.
//!
//! ## Limitations
//!
//! - **No persistence**: everything lives in process memory.
//! - **No check-then-insert atomicity**: `insert` itself is atomic, but a
//!   caller's preceding existence check is not part of it. Two writers that
//!   both observe "absent" will both insert.
//!
//! Use this backend for:
//! - Testing the filesystem model, include resolver and graph adapter
//! - Embedding mobius in tools that analyse one source tree per run

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use crate::context::Context;
use crate::model::*;
use crate::Result;
use super::{BackendConfig, StorageBackend};

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory triple storage.
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    table: RwLock<TripleTable>,
    next_id: AtomicU64,
    id_prefix: String,
    max_traversal_depth: usize,
}

#[derive(Default)]
struct TripleTable {
    triples: Vec<Triple>,
    present: HashSet<Triple>,
    /// subject → triple positions
    by_subject: HashMap<Value, Vec<usize>>,
    /// object → triple positions
    by_object: HashMap<Value, Vec<usize>>,
    /// subjects and objects in first-seen order
    nodes: Vec<Value>,
    node_set: HashSet<Value>,
}

impl TripleTable {
    fn add_node(&mut self, v: &Value) {
        if self.node_set.insert(v.clone()) {
            self.nodes.push(v.clone());
        }
    }

    fn add(&mut self, triple: Triple) {
        if self.present.contains(&triple) {
            return;
        }
        let pos = self.triples.len();
        self.add_node(&triple.subject);
        self.add_node(&triple.object);
        self.by_subject.entry(triple.subject.clone()).or_default().push(pos);
        self.by_object.entry(triple.object.clone()).or_default().push(pos);
        self.present.insert(triple.clone());
        self.triples.push(triple);
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_config(&BackendConfig::default())
    }

    pub fn with_config(config: &BackendConfig) -> Self {
        let BackendConfig::Memory { max_traversal_depth, id_prefix } = config;
        Self {
            inner: Arc::new(MemoryInner {
                table: RwLock::new(TripleTable::default()),
                next_id: AtomicU64::new(1),
                id_prefix: id_prefix.clone(),
                max_traversal_depth: *max_traversal_depth,
            }),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryBackend {
    /// Clones share the same underlying store.
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

// ============================================================================
// StorageBackend impl
// ============================================================================

impl StorageBackend for MemoryBackend {
    fn insert(&self, ctx: &Context, triples: &[Triple]) -> Result<()> {
        ctx.check()?;
        let mut table = self.inner.table.write();
        for triple in triples {
            table.add(triple.clone());
        }
        Ok(())
    }

    fn triples(
        &self,
        ctx: &Context,
        node: &Value,
        dir: Direction,
        predicate: Option<&Value>,
    ) -> Result<Vec<Triple>> {
        ctx.check()?;
        let table = self.inner.table.read();

        let mut positions: Vec<usize> = Vec::new();
        if matches!(dir, Direction::Outgoing | Direction::Both) {
            positions.extend(table.by_subject.get(node).into_iter().flatten());
        }
        if matches!(dir, Direction::Incoming | Direction::Both) {
            positions.extend(table.by_object.get(node).into_iter().flatten());
        }
        if dir == Direction::Both {
            // Self-loops are indexed under both ends.
            positions.sort_unstable();
            positions.dedup();
        }

        Ok(positions
            .into_iter()
            .map(|pos| &table.triples[pos])
            .filter(|t| predicate.is_none_or(|p| t.predicate == *p))
            .cloned()
            .collect())
    }

    fn all_nodes(&self, ctx: &Context) -> Result<Vec<Value>> {
        ctx.check()?;
        Ok(self.inner.table.read().nodes.clone())
    }

    fn generate_id(&self) -> Value {
        let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        Value::BNode(format!("{}{n}", self.inner.id_prefix))
    }

    fn triple_count(&self, ctx: &Context) -> Result<u64> {
        ctx.check()?;
        Ok(self.inner.table.read().triples.len() as u64)
    }

    fn node_count(&self, ctx: &Context) -> Result<u64> {
        ctx.check()?;
        Ok(self.inner.table.read().nodes.len() as u64)
    }

    fn max_traversal_depth(&self) -> usize {
        self.inner.max_traversal_depth
    }
}

// ============================================================================
// Tests
// ============================================================================
