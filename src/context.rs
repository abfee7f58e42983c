//! Call context passed into every store operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::{Error, Result};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque context identifier, useful for correlating log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Caller-supplied context for store calls.
///
/// Cancellation is not a special state: a store call made under a cancelled
/// context fails like any other store call, with `Error::StorageError`.
#[derive(Debug, Clone)]
pub struct Context {
    id: ContextId,
    cancel: Option<CancelToken>,
}

impl Context {
    /// A context that is never cancelled.
    pub fn background() -> Self {
        Self {
            id: ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)),
            cancel: None,
        }
    }

    /// A context observing `token`.
    pub fn with_cancel(token: CancelToken) -> Self {
        Self { cancel: Some(token), ..Self::background() }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Fail if the context has been cancelled. Stores call this on entry.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::StorageError(format!(
                "operation cancelled (context {})", self.id.0
            )));
        }
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
