//! A store kept entirely in process memory.
//!
//! Nothing is written anywhere; the store lives as long as its last clone. It implements the
//! full [`norm_core::Repository`] contract and is what the contract test suite runs against.

mod query;
mod repository;

pub use query::{Filter, MemoryQuery};
pub use repository::{Entity, MemoryRepository};
