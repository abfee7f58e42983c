//! # Storage Backend Trait
//!
//! This is THE contract between mobius and any triple store.
//! The core depends on exactly four capabilities:
//!
//! | Capability | Method |
//! |------------|--------|
//! | Insert triples (one record = one atomic call) | `insert` |
//! | Read the triples around a node | `triples` |
//! | Evaluate a traversal from zero or more seeds | `evaluate` |
//! | Generate a fresh unique identifier | `generate_id` |
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryBackend` | `memory` | In-memory for testing/embedding |

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::model::*;
use crate::traversal::{self, Query};
use crate::{Error, Result};

pub use memory::MemoryBackend;

/// Safety limit for unbounded recursive traversal steps.
pub const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = 100;

/// Default prefix for generated blank-node identifiers.
pub const DEFAULT_ID_PREFIX: &str = "n";

// ============================================================================
// Backend Configuration
// ============================================================================

/// Configuration for a storage backend.
///
/// ```json
/// { "backend": "memory", "max_traversal_depth": 64, "id_prefix": "f" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-memory (no persistence)
    Memory {
        #[serde(default = "default_max_traversal_depth")]
        max_traversal_depth: usize,
        #[serde(default = "default_id_prefix")]
        id_prefix: String,
    },
}

fn default_max_traversal_depth() -> usize {
    DEFAULT_MAX_TRAVERSAL_DEPTH
}

fn default_id_prefix() -> String {
    DEFAULT_ID_PREFIX.to_owned()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Memory {
            max_traversal_depth: DEFAULT_MAX_TRAVERSAL_DEPTH,
            id_prefix: default_id_prefix(),
        }
    }
}

impl BackendConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        let config: BackendConfig = serde_json::from_str(s)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            BackendConfig::Memory { max_traversal_depth, id_prefix } => {
                if *max_traversal_depth == 0 {
                    return Err(Error::ConfigError("max_traversal_depth must be at least 1".into()));
                }
                if id_prefix.is_empty() {
                    return Err(Error::ConfigError("id_prefix must not be empty".into()));
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// Expand depth specification
// ============================================================================

/// Depth specification for recursive traversal steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandDepth {
    /// Exact depth
    Exact(usize),
    /// Range: min..max (inclusive)
    Range { min: usize, max: usize },
    /// Unbounded (up to implementation limit)
    Unbounded,
}

impl ExpandDepth {
    /// Inclusive `(min, max)` bounds, with `Unbounded` capped at `limit`.
    pub fn bounds(self, limit: usize) -> (usize, usize) {
        match self {
            ExpandDepth::Exact(d) => (d, d.min(limit)),
            ExpandDepth::Range { min, max } => (min, max.min(limit)),
            ExpandDepth::Unbounded => (1, limit),
        }
    }
}

// ============================================================================
// StorageBackend Trait
// ============================================================================

/// The universal storage contract.
///
/// Calls are blocking. Every method that touches data takes the caller's
/// `Context` and must fail with `Error::StorageError` once it is cancelled.
pub trait StorageBackend: Send + Sync + 'static {
    /// Insert triples as one unit: either all become visible or none do.
    /// Triples already present are ignored.
    fn insert(&self, ctx: &Context, triples: &[Triple]) -> Result<()>;

    /// Triples touching `node` in `dir`, optionally restricted to `predicate`.
    fn triples(
        &self,
        ctx: &Context,
        node: &Value,
        dir: Direction,
        predicate: Option<&Value>,
    ) -> Result<Vec<Triple>>;

    /// Every subject and object in the store, in a stable order.
    fn all_nodes(&self, ctx: &Context) -> Result<Vec<Value>>;

    /// A fresh identifier that has never been handed out by this store.
    fn generate_id(&self) -> Value;

    /// Total number of triples.
    fn triple_count(&self, ctx: &Context) -> Result<u64>;

    /// Total number of nodes.
    ///
    /// Default: counts `all_nodes`.
    fn node_count(&self, ctx: &Context) -> Result<u64> {
        Ok(self.all_nodes(ctx)?.len() as u64)
    }

    /// Cap applied to `ExpandDepth::Unbounded`.
    fn max_traversal_depth(&self) -> usize {
        DEFAULT_MAX_TRAVERSAL_DEPTH
    }

    /// Evaluate a traversal from the query's seeds.
    ///
    /// Default: the reference evaluator in `traversal::eval`, built on
    /// `triples` and `all_nodes`.
    fn evaluate(&self, ctx: &Context, query: &Query) -> Result<Vec<Value>> {
        traversal::evaluate(self, ctx, query)
    }
}
