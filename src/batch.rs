//! Partial results for batch operations.

use crate::Error;

/// Outcome of a batch operation: whatever succeeded, plus one error per
/// item that failed. Callers must inspect both.
#[derive(Debug)]
pub struct Partial<T> {
    pub value: T,
    pub errors: Vec<Error>,
}

impl<T> Partial<T> {
    pub fn new(value: T) -> Self {
        Self { value, errors: Vec::new() }
    }

    pub fn with_errors(value: T, errors: Vec<Error>) -> Self {
        Self { value, errors }
    }

    pub fn push_error(&mut self, err: Error) {
        self.errors.push(err);
    }

    /// True when no item failed.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Split into `(value, errors)`.
    pub fn into_parts(self) -> (T, Vec<Error>) {
        (self.value, self.errors)
    }
}

impl<T: Default> Default for Partial<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
