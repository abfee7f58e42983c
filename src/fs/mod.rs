//! # Virtual Filesystem
//!
//! Directories and files are records in the triple store:
//!
//! ```text
//! _:n3 <fs:name> "b.c"
//! _:n3 <fs:dir>  _:n2        (weak back-reference to the parent)
//! _:n2 <fs:name> "a"
//! _:n2 <fs:dir>  _:n1
//! _:n1 <fs:name> "."
//! _:n1 <rdf:type> <fs:root>
//! ```
//!
//! Exactly one node per store carries the root tag. Every other node has one
//! `fs:dir` parent, and walking parents always ends at the root because
//! `create` only ever links a node to a parent resolved from a strictly
//! shorter path.
//!
//! ## Concurrency
//!
//! `create` and `ensure_root` check for existence and then insert; the two
//! are not atomic. Concurrent creators of the same path can both insert,
//! leaving duplicate same-named children. Callers that need exactly-once
//! creation must serialize writers externally.

pub mod path;

use hashbrown::HashSet;
use tracing::debug;

use crate::context::Context;
use crate::model::{Triple, Value};
use crate::schema::{Fields, Record, RDF_TYPE};
use crate::storage::StorageBackend;
use crate::traversal::{Query, Traversal};
use crate::{Error, Graph, Result};

use self::path::Path;

/// Basename predicate.
pub const NAME: &str = "fs:name";
/// Parent-directory predicate (child → parent).
pub const DIR: &str = "fs:dir";
/// Type tag of the root record.
pub const ROOT: &str = "fs:root";

// ============================================================================
// File record
// ============================================================================

/// A file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub id: Value,
    pub name: String,
    /// Parent directory; `None` only for the root.
    pub dir: Option<Value>,
}

impl Record for File {
    fn id(&self) -> &Value {
        &self.id
    }

    fn to_triples(&self) -> Vec<Triple> {
        let mut triples = vec![Triple::new(self.id.clone(), Value::iri(NAME), Value::from(self.name.as_str()))];
        if let Some(dir) = &self.dir {
            triples.push(Triple::new(self.id.clone(), Value::iri(DIR), dir.clone()));
        }
        triples
    }

    fn from_triples(id: Value, triples: &[Triple]) -> Result<Self> {
        let fields = Fields::new(&id, triples);
        let name = fields.string(NAME)?;
        let dir = fields.reference(DIR)?;
        Ok(File { id, name, dir })
    }
}

/// The root record: a `File` tagged `rdf:type fs:root`.
struct RootFile(File);

impl Record for RootFile {
    fn id(&self) -> &Value {
        &self.0.id
    }

    fn to_triples(&self) -> Vec<Triple> {
        let mut triples = self.0.to_triples();
        triples.push(Triple::new(self.0.id.clone(), Value::iri(RDF_TYPE), Value::iri(ROOT)));
        triples
    }

    fn from_triples(id: Value, triples: &[Triple]) -> Result<Self> {
        if !Fields::new(&id, triples).has_type(ROOT) {
            return Err(Error::SchemaError(format!("{id} is not tagged {ROOT}")));
        }
        File::from_triples(id, triples).map(RootFile)
    }
}

// ============================================================================
// Root discovery
// ============================================================================

/// Nodes tagged as root.
pub fn root_rule() -> Traversal {
    Traversal::new().has(Value::iri(RDF_TYPE), [Value::iri(ROOT)])
}

/// Ask the store for the root. `None` means the store has none.
pub fn find_root<B: StorageBackend>(graph: &Graph<B>, ctx: &Context) -> Result<Option<File>> {
    match graph.first(ctx, &Query::all().follow(&root_rule()))? {
        None => Ok(None),
        Some(id) => Ok(Some(graph.select::<RootFile>(ctx, &id)?.0)),
    }
}

/// Insert a new root record unconditionally.
pub fn new_root<B: StorageBackend>(graph: &Graph<B>, ctx: &Context) -> Result<File> {
    let root = File { id: graph.generate_id(), name: ".".to_owned(), dir: None };
    graph.insert(ctx, &RootFile(root.clone()))?;
    debug!(id = %root.id, "created filesystem root");
    Ok(root)
}

/// Find the root, creating it if the store has none.
///
/// Idempotent for sequential callers; see the module docs for concurrent ones.
pub fn ensure_root<B: StorageBackend>(graph: &Graph<B>, ctx: &Context) -> Result<File> {
    match find_root(graph, ctx)? {
        Some(root) => Ok(root),
        None => new_root(graph, ctx),
    }
}

// ============================================================================
// Fs
// ============================================================================

/// Filesystem view over a graph, anchored at a cached root record.
pub struct Fs<'g, B: StorageBackend> {
    graph: &'g Graph<B>,
    root: File,
}

impl<'g, B: StorageBackend> Fs<'g, B> {
    /// Attach to the store's root, creating one if absent.
    pub fn new(graph: &'g Graph<B>, ctx: &Context) -> Result<Self> {
        let root = ensure_root(graph, ctx)?;
        Ok(Self { graph, root })
    }

    pub fn graph(&self) -> &'g Graph<B> {
        self.graph
    }

    pub fn root(&self) -> &File {
        &self.root
    }

    /// Query evaluating `path` from the root.
    pub fn query(&self, path: &Path) -> Query {
        Query::from_nodes([self.root.id.clone()]).follow(&path.compile())
    }

    /// Resolve `path` to a node. First result wins.
    pub fn lookup(&self, ctx: &Context, path: impl AsRef<str>) -> Result<Option<Value>> {
        self.graph.first(ctx, &self.query(&Path::new(path.as_ref())))
    }

    /// Resolve `path` and load its record, if it exists.
    pub fn lookup_file(&self, ctx: &Context, path: impl AsRef<str>) -> Result<Option<File>> {
        match self.lookup(ctx, path)? {
            Some(id) => self.graph.select(ctx, &id).map(Some),
            None => Ok(None),
        }
    }

    /// Load the record at `path`; `NotFound` if nothing resolves.
    pub fn open(&self, ctx: &Context, path: impl AsRef<str>) -> Result<File> {
        let path = path.as_ref();
        self.lookup_file(ctx, path)?
            .ok_or_else(|| Error::NotFound(format!("file {path}")))
    }

    /// Create `path`, creating missing parent directories first.
    ///
    /// Fails with `AlreadyExists` if `path` already resolves (the root always
    /// does, so does `a/..` once `a` exists), and with `InvalidPath` if it
    /// does not resolve and its last segment is `..`.
    pub fn create(&self, ctx: &Context, path: impl AsRef<str>) -> Result<File> {
        let path = Path::new(path.as_ref());
        if self.lookup(ctx, path.as_str())?.is_some() {
            return Err(Error::AlreadyExists(format!("file {path}")));
        }
        let Some((up, base)) = path.split_last() else {
            return Err(Error::AlreadyExists(format!("file {path}")));
        };
        if base == ".." {
            return Err(Error::InvalidPath(format!("cannot create parent reference {path}")));
        }

        // `up` is strictly shorter than `path`, so this bottoms out at the root.
        let dir = match self.lookup(ctx, up.as_str())? {
            Some(dir) => dir,
            None => self.create(ctx, up.as_str())?.id,
        };

        let file = File {
            id: self.graph.generate_id(),
            name: base.to_owned(),
            dir: Some(dir),
        };
        self.graph.insert(ctx, &file)?;
        debug!(path = %path, id = %file.id, "created file");
        Ok(file)
    }

    /// Path of `node` relative to the root, e.g. `"a/b.c"`; `"."` for the root.
    ///
    /// Walks `fs:dir` links one record at a time, so depth is not limited.
    /// Fails with `RootNotFound` if the walk ends, or loops, without meeting
    /// this filesystem's root.
    pub fn reverse_path(&self, ctx: &Context, node: &Value) -> Result<String> {
        let mut names: Vec<String> = Vec::new();
        let mut seen: HashSet<Value> = HashSet::new();
        let mut current = node.clone();

        while current != self.root.id {
            if !seen.insert(current.clone()) {
                return Err(Error::RootNotFound(format!("cycle above {node} at {current}")));
            }
            let file: File = self.graph.select(ctx, &current)?;
            names.push(file.name);
            current = file
                .dir
                .ok_or_else(|| Error::RootNotFound(format!("walking up from {node}")))?;
        }

        if names.is_empty() {
            return Ok(".".to_owned());
        }
        names.reverse();
        Ok(names.join("/"))
    }
}

// ============================================================================
// Tests
// ============================================================================
