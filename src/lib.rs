//! # mobius: Graph-Native Virtual Filesystem
//!
//! Models a directory hierarchy and the `#include` relationships between
//! source files as nodes and edges in a triple store, and exposes that graph
//! to petgraph's algorithms (cycle detection finds circular includes).
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `StorageBackend` is the contract between the core and storage
//! 2. **Traversals are data**: a path compiles to a `Traversal`, a pure value
//!    any backend can evaluate from any seed set
//! 3. **Weak parents**: a file names its directory by identifier, never by ownership
//! 4. **Batches never throw away progress**: they return `Partial<T>`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mobius::{Context, Fs, Graph};
//! use mobius::include::{self, Include};
//!
//! # fn example() -> mobius::Result<()> {
//! let graph = Graph::open_memory();
//! let ctx = Context::background();
//! let fs = Fs::new(&graph, &ctx)?;
//!
//! fs.create(&ctx, "src/main.c")?;
//! fs.create(&ctx, "include/util.h")?;
//!
//! let (search, _errors) = include::search_path(&fs, &ctx, ["include"]).into_parts();
//! let resolved = include::resolve(&graph, &ctx, search.as_ref(), &[Include::new("#include <util.h>")]);
//! assert!(resolved.is_complete());
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | `fs::path` | Path compiler: text → `Traversal` |
//! | `fs` | Virtual filesystem: lookup / open / create / reverse path |
//! | `adapter` | Directed-graph view over any adjacency rule |
//! | `include` | `#include` classification and resolution |
//! | `import` | Walk an OS directory into the virtual filesystem |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod context;
pub mod storage;
pub mod schema;
pub mod traversal;
pub mod fs;
pub mod adapter;
pub mod include;
pub mod filter;
pub mod import;
pub mod batch;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Value, Triple, Direction};
pub use context::{Context, CancelToken};
pub use storage::{StorageBackend, BackendConfig, ExpandDepth, MemoryBackend};
pub use schema::Record;
pub use traversal::{Traversal, Step, Query};
pub use fs::{Fs, File, path::Path};
pub use adapter::{Directed, NodeKey, Edge};
pub use batch::Partial;

use tracing::debug;

// ============================================================================
// Top-level Graph handle
// ============================================================================

/// The primary entry point. A `Graph` wraps a storage backend and provides
/// typed record access and traversal evaluation.
pub struct Graph<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> Graph<B> {
    /// Create a Graph with the given backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Access the underlying backend (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// A fresh identifier from the backend.
    pub fn generate_id(&self) -> Value {
        self.backend.generate_id()
    }

    /// Write a record in one atomic insert. Returns its identifier.
    pub fn insert<R: Record>(&self, ctx: &Context, record: &R) -> Result<Value> {
        let triples = record.to_triples();
        self.backend.insert(ctx, &triples)?;
        debug!(id = %record.id(), triples = triples.len(), "inserted record");
        Ok(record.id().clone())
    }

    /// Load the record stored under `id`.
    pub fn select<R: Record>(&self, ctx: &Context, id: &Value) -> Result<R> {
        let triples = self.backend.triples(ctx, id, Direction::Outgoing, None)?;
        if triples.is_empty() {
            return Err(Error::NotFound(format!("record {id}")));
        }
        R::from_triples(id.clone(), &triples)
    }

    /// Insert raw triples (edges that belong to no record).
    pub fn add_triples(&self, ctx: &Context, triples: &[Triple]) -> Result<()> {
        self.backend.insert(ctx, triples)
    }

    /// Evaluate a query; results are ordered and de-duplicated.
    pub fn evaluate(&self, ctx: &Context, query: &Query) -> Result<Vec<Value>> {
        self.backend.evaluate(ctx, query)
    }

    /// First result of a query, if any.
    pub fn first(&self, ctx: &Context, query: &Query) -> Result<Option<Value>> {
        Ok(self.evaluate(ctx, query)?.into_iter().next())
    }
}

/// In-memory graph for testing and embedding.
impl Graph<MemoryBackend> {
    pub fn open_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    pub fn open(config: &BackendConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_backend(MemoryBackend::with_config(config)))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Root not found: {0}")]
    RootNotFound(String),

    /// Opaque failure surfaced by the store, including cancellation.
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid include directive: {0:?}")]
    InvalidInclude(String),

    #[error("No path found in include directive {0:?}")]
    NoPathFound(String),

    #[error("Include {0:?} not resolved")]
    Unresolved(String),

    #[error("Include {include:?} resolved ambiguously: {candidates:?}")]
    Ambiguous { include: String, candidates: Vec<Value> },

    #[error("No include search path")]
    NoSearchPath,

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Filter error: {0}")]
    FilterError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Fields;

    struct Tag {
        id: Value,
        label: String,
    }

    impl Record for Tag {
        fn id(&self) -> &Value {
            &self.id
        }

        fn to_triples(&self) -> Vec<Triple> {
            vec![Triple::new(self.id.clone(), Value::iri("ex:label"), Value::from(self.label.as_str()))]
        }

        fn from_triples(id: Value, triples: &[Triple]) -> Result<Self> {
            let label = Fields::new(&id, triples).string("ex:label")?;
            Ok(Tag { id, label })
        }
    }

    #[test]
    fn test_insert_and_select_record() {
        let graph = Graph::open_memory();
        let ctx = Context::background();
        let id = graph.insert(&ctx, &Tag { id: graph.generate_id(), label: "x".into() }).unwrap();

        let tag: Tag = graph.select(&ctx, &id).unwrap();
        assert_eq!(tag.label, "x");
        assert_eq!(tag.id, id);
    }

    #[test]
    fn test_select_missing_record() {
        let graph = Graph::open_memory();
        let ctx = Context::background();
        let result = graph.select::<Tag>(&ctx, &Value::bnode("nope"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_open_with_config() {
        let config = BackendConfig::Memory { max_traversal_depth: 3, id_prefix: "t".into() };
        let graph = Graph::open(&config).unwrap();
        assert_eq!(graph.generate_id(), Value::bnode("t1"));
        assert_eq!(graph.backend().max_traversal_depth(), 3);

        let bad = BackendConfig::Memory { max_traversal_depth: 0, id_prefix: "t".into() };
        assert!(matches!(Graph::open(&bad), Err(Error::ConfigError(_))));
    }
}
