//! Typing contracts for the repository pattern.
//!
//! A [`Repository`] stores models by identifier and searches them through a [`QueryMapper`]:
//! callers record domain level intent on the mapper from a closure, the repository applies that
//! intent to a technology specific [`QueryBuilder`] and runs the result.

mod query;
mod repository;
pub mod result;

pub use query::{QueryBuilder, QueryMapper};
pub use repository::Repository;
pub use result::{NotFound, NotFoundExt, QueryError, QueryResult, RepoError, RepoResult};
