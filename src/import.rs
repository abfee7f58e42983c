//! Import an OS directory tree into the virtual filesystem.
//!
//! Every entry under the import root becomes a file whose path is the
//! entry's path relative to that root, joined with `/`. A filter sees those
//! relative paths and decides which entries are created. Rejected
//! directories are still walked, and an accepted entry inside one creates
//! it implicitly.

use std::path::{Path as OsPath, PathBuf};

use tracing::{info, trace, warn};
use walkdir::WalkDir;

use crate::context::Context;
use crate::filter::{BoxFilter, Filter};
use crate::fs::Fs;
use crate::storage::StorageBackend;
use crate::{Error, Partial, Result};

pub struct Importer {
    root: PathBuf,
    filter: Option<BoxFilter<str>>,
}

impl Importer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), filter: None }
    }

    /// Only create entries whose relative path passes `filter`.
    pub fn with_filter(mut self, filter: impl Filter<str> + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Walk the root in file-name order and create what passes the filter.
    ///
    /// The value is the number of entries created. Entries that already
    /// resolve are skipped. Failures are collected per entry; cancelling
    /// `ctx` stops the walk.
    pub fn import<B: StorageBackend>(&self, fs: &Fs<'_, B>, ctx: &Context) -> Partial<usize> {
        let mut out = Partial::new(0);

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            if let Err(e) = ctx.check() {
                out.push_error(e);
                break;
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "failed to read directory entry");
                    out.push_error(Error::Io(e.into()));
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            match self.import_one(fs, ctx, entry.path()) {
                Ok(true) => out.value += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to import entry");
                    out.push_error(e);
                }
            }
        }

        info!(
            root = %self.root.display(),
            created = out.value,
            errors = out.errors.len(),
            "import finished"
        );
        out
    }

    fn import_one<B: StorageBackend>(&self, fs: &Fs<'_, B>, ctx: &Context, path: &OsPath) -> Result<bool> {
        let rel = relative_path(&self.root, path)?;
        if let Some(filter) = &self.filter {
            if !filter.filter(rel.as_str())? {
                trace!(path = %rel, "filtered out");
                return Ok(false);
            }
        }
        if fs.lookup(ctx, &rel)?.is_some() {
            return Ok(false);
        }
        fs.create(ctx, &rel)?;
        Ok(true)
    }
}

/// `path` relative to `root`, `/`-separated.
fn relative_path(root: &OsPath, path: &OsPath) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| Error::InvalidPath(format!("{} is outside {}", path.display(), root.display())))?;
    let parts = rel
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .ok_or_else(|| Error::InvalidPath(format!("{} is not valid UTF-8", rel.display())))
        })
        .collect::<Result<Vec<&str>>>()?;
    Ok(parts.join("/"))
}
