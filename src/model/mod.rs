//! # Triple Graph Model
//!
//! Clean DTOs shared by the store, the traversal evaluator, the filesystem
//! model and the graph adapter.
//!
//! Pure data. Nothing here does I/O or takes a lock.

pub mod value;
pub mod triple;

pub use value::Value;
pub use triple::{Triple, Direction};
