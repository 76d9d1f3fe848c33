use crate::result::QueryResult;

/// A technology specific query under construction.
///
/// No operations are declared here. A concrete builder
/// (a SQL statement builder, a mongo filter document, an in-memory filter tree) exposes its own
/// calls such as `equals`, `and` or `or`, each of which mutates the query it holds and can be
/// called any number of times while a [`QueryMapper`] is applied to it.
///
/// A builder is created fresh for each query and dropped once the query has run.
pub trait QueryBuilder: Send {}

/// Maps domain level filter intent onto a [`QueryBuilder`].
///
/// Concrete mappers expose domain methods (`closed_tasks()`, `created_by(user)`, ...) that a
/// caller invokes from a filter predicate to record what they want. The owning repository then
/// calls [`QueryMapper::apply`] once, handing over a fresh builder for its technology.
///
/// ```
/// use norm_core::{QueryBuilder, QueryMapper, QueryResult};
///
/// trait StatusQuery: QueryBuilder {
///     fn equals(&mut self, field: &str, value: &str);
/// }
///
/// #[derive(Default)]
/// struct TodoQueryMapper {
///     closed_only: bool,
/// }
///
/// impl TodoQueryMapper {
///     fn closed_tasks(&mut self) {
///         self.closed_only = true;
///     }
/// }
///
/// impl<B: StatusQuery> QueryMapper<B> for TodoQueryMapper {
///     fn apply(&self, query_builder: &mut B) -> QueryResult<()> {
///         if self.closed_only {
///             query_builder.equals("status", "CLOSED");
///         }
///         Ok(())
///     }
/// }
/// ```
///
/// With a repository using this mapper, `repo.find(|q| q.closed_tasks())` returns the closed
/// todos.
pub trait QueryMapper<B: QueryBuilder> {
    /// Transfer the recorded intent onto `query_builder`.
    ///
    /// Must only call operations of `B`, never do I/O, and must produce the same calls every
    /// time it is applied with the same recorded state. Fails when the recorded intent is an
    /// invalid combination.
    fn apply(&self, query_builder: &mut B) -> QueryResult<()>;
}
