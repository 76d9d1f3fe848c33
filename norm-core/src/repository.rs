use crate::query::{QueryBuilder, QueryMapper};
use crate::result::RepoResult;
use std::sync::Arc;

/// Technology agnostic access to entities of type [`Repository::Model`] keyed by
/// [`Repository::Ident`].
///
/// Every call is its own unit of work: no mapper or builder outlives the call that created it.
/// Stores report a missing identifier with [`crate::NotFound`] under the operation's
/// [`crate::RepoError`].
pub trait Repository {
    type Ident: Send + Sync;
    type Model: Send;
    type Builder: QueryBuilder;
    type Mapper: QueryMapper<Self::Builder> + Default + Send;

    /// Persist a new entity, returning it as stored (generated identifier included).
    fn save(
        &self,
        entity: Self::Model,
    ) -> impl Future<Output = RepoResult<Self::Model>> + Send;

    /// Replace an existing entity. Fails with not found if it was never saved.
    fn update(
        &self,
        entity: Self::Model,
    ) -> impl Future<Output = RepoResult<Self::Model>> + Send;

    /// Remove the entity addressed by `ident`. Fails with not found if there is none.
    fn delete(&self, ident: Self::Ident) -> impl Future<Output = RepoResult<()>> + Send;

    /// Fails with not found if no entity is addressed by `ident`.
    fn find_by_id(
        &self,
        ident: Self::Ident,
    ) -> impl Future<Output = RepoResult<Self::Model>> + Send;

    /// No ordering is guaranteed.
    fn find_all(&self) -> impl Future<Output = RepoResult<Vec<Self::Model>>> + Send;

    /// `predicate` is a caller supplied closure recording filter intent on the mapper.
    ///
    /// Run `predicate` against a fresh [`Repository::Mapper`], apply the mapper once to a fresh
    /// [`Repository::Builder`] and return whatever the resulting query matches.
    /// A predicate that records nothing matches the same entities as [`Repository::find_all`].
    fn find<P>(&self, predicate: P) -> impl Future<Output = RepoResult<Vec<Self::Model>>> + Send
    where
        P: FnOnce(&mut Self::Mapper) + Send;
}

impl<T> Repository for Arc<T>
where
    T: Repository + Send + Sync,
{
    type Ident = T::Ident;
    type Model = T::Model;
    type Builder = T::Builder;
    type Mapper = T::Mapper;

    async fn save(&self, entity: Self::Model) -> RepoResult<Self::Model> {
        (**self).save(entity).await
    }

    async fn update(&self, entity: Self::Model) -> RepoResult<Self::Model> {
        (**self).update(entity).await
    }

    async fn delete(&self, ident: Self::Ident) -> RepoResult<()> {
        (**self).delete(ident).await
    }

    async fn find_by_id(&self, ident: Self::Ident) -> RepoResult<Self::Model> {
        (**self).find_by_id(ident).await
    }

    async fn find_all(&self) -> RepoResult<Vec<Self::Model>> {
        (**self).find_all().await
    }

    async fn find<P>(&self, predicate: P) -> RepoResult<Vec<Self::Model>>
    where
        P: FnOnce(&mut Self::Mapper) + Send,
    {
        (**self).find(predicate).await
    }
}
