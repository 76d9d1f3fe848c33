use error_stack::Report;

pub type RepoResult<T> = Result<T, Report<RepoError>>;
pub type QueryResult<T> = Result<T, Report<QueryError>>;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum RepoError {
    #[error("failed to save entity")]
    Save,
    #[error("failed to update entity")]
    Update,
    #[error("failed to delete entity")]
    Delete,
    #[error("failed to find entity by id")]
    FindById,
    #[error("failed to list entities")]
    FindAll,
    #[error("failed to find entities")]
    Find,
}

/// Raised by a store when an identifier does not address a stored entity.
/// Stores change this into the [`RepoError`] of the failing operation, so check for it with
/// [`NotFoundExt::is_not_found`] rather than matching on the outer context.
#[derive(Debug, thiserror::Error)]
#[error("no entity exists with id {0}")]
pub struct NotFound(pub String);

impl NotFound {
    pub fn new(ident: impl ToString) -> Self {
        Self(ident.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to build query")]
pub struct QueryError;

pub trait NotFoundExt {
    fn is_not_found(&self) -> bool;
}

impl NotFoundExt for Report<RepoError> {
    fn is_not_found(&self) -> bool {
        self.contains::<NotFound>()
    }
}

impl<T> NotFoundExt for RepoResult<T> {
    fn is_not_found(&self) -> bool {
        matches!(self, Err(report) if report.is_not_found())
    }
}
