//! Search paths and include resolution.
//!
//! A search path is a `Query` seeded with the search directories. Resolving
//! an include appends the include's compiled path to it, so each directory
//! is an alternative starting point and a hit in two of them is ambiguous.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::{Include, DEPENDS};
use crate::context::Context;
use crate::fs::path::Path;
use crate::fs::Fs;
use crate::model::{Triple, Value};
use crate::storage::StorageBackend;
use crate::traversal::Query;
use crate::{Error, Graph, Partial, Result};

/// Build a search path from directory paths, in order.
///
/// Directories that do not resolve are reported and left out. The value is
/// `None` when no directory resolved: a query with no seeds would start
/// from every node in the store.
pub fn search_path<B, I>(fs: &Fs<'_, B>, ctx: &Context, dirs: I) -> Partial<Option<Query>>
where
    B: StorageBackend,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seeds = Vec::new();
    let mut errors = Vec::new();
    for dir in dirs {
        let dir = dir.as_ref();
        match fs.lookup(ctx, dir) {
            Ok(Some(node)) => seeds.push(node),
            Ok(None) => errors.push(Error::NotFound(format!("include directory {dir}"))),
            Err(e) => errors.push(e),
        }
    }
    let query = (!seeds.is_empty()).then(|| Query::from_nodes(seeds));
    Partial::with_errors(query, errors)
}

/// Resolve each include against `search`.
///
/// An include that matches exactly one node adds it to the result. No match
/// is `Unresolved`, several are `Ambiguous`, and neither adds anything.
/// Every include is attempted whatever happened to the ones before it.
pub fn resolve<B: StorageBackend>(
    graph: &Graph<B>,
    ctx: &Context,
    search: Option<&Query>,
    includes: &[Include],
) -> Partial<BTreeSet<Value>> {
    let mut out = Partial::<BTreeSet<Value>>::default();
    let Some(search) = search else {
        out.push_error(Error::NoSearchPath);
        return out;
    };

    for include in includes {
        let path = match include.path() {
            Ok(path) => path,
            Err(e) => {
                out.push_error(e);
                continue;
            }
        };
        let query = search.clone().follow(&Path::new(path).compile());
        let mut nodes = match graph.evaluate(ctx, &query) {
            Ok(nodes) => nodes,
            Err(e) => {
                out.push_error(e);
                continue;
            }
        };
        trace!(include = %include, matches = nodes.len(), "evaluated include");
        match nodes.len() {
            0 => out.push_error(Error::Unresolved(include.to_string())),
            1 => {
                out.value.extend(nodes.pop());
            }
            _ => out.push_error(Error::Ambiguous {
                include: include.to_string(),
                candidates: nodes,
            }),
        }
    }
    out
}

/// Record that `source` includes each of `targets`, in one insert.
pub fn link_dependencies<'a, B: StorageBackend>(
    graph: &Graph<B>,
    ctx: &Context,
    source: &Value,
    targets: impl IntoIterator<Item = &'a Value>,
) -> Result<()> {
    let triples: Vec<Triple> = targets
        .into_iter()
        .map(|target| Triple::new(source.clone(), Value::iri(DEPENDS), target.clone()))
        .collect();
    if triples.is_empty() {
        return Ok(());
    }
    graph.add_triples(ctx, &triples)?;
    debug!(source = %source, count = triples.len(), "linked dependencies");
    Ok(())
}
