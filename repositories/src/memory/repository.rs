use crate::memory::query::MemoryQuery;
use error_stack::{Report, ResultExt};
use norm_core::{NotFound, QueryMapper, RepoError, RepoResult, Repository};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// A model the in-memory store can hold.
///
/// The identifier is optional on the model so that `save` can fill it in.
pub trait Entity: Serialize + Clone + Send + Sync + 'static {
    type Ident: Ord + Clone + Display + Debug + Send + Sync + 'static;

    fn ident(&self) -> Option<&Self::Ident>;
    fn set_ident(&mut self, ident: Self::Ident);
}

type NewIdFn<I> = Arc<dyn Fn() -> I + Send + Sync>;

/// Keeps entities in a map ordered by identifier. Clones share the same map.
pub struct MemoryRepository<M: Entity, Q> {
    entities: Arc<RwLock<BTreeMap<M::Ident, M>>>,
    new_id_fn: NewIdFn<M::Ident>,
    _mapper: PhantomData<fn() -> Q>,
}

impl<M: Entity, Q> Clone for MemoryRepository<M, Q> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
            new_id_fn: Arc::clone(&self.new_id_fn),
            _mapper: PhantomData,
        }
    }
}

impl<M: Entity, Q> Debug for MemoryRepository<M, Q> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository").finish_non_exhaustive()
    }
}

impl<M: Entity, Q> MemoryRepository<M, Q> {
    /// `new_id_fn` is called whenever an entity without an identifier is saved.
    pub fn new<F>(new_id_fn: F) -> Self
    where
        F: Fn() -> M::Ident + Send + Sync + 'static,
    {
        Self {
            entities: Arc::new(RwLock::new(BTreeMap::new())),
            new_id_fn: Arc::new(new_id_fn),
            _mapper: PhantomData,
        }
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

impl<M, Q> MemoryRepository<M, Q>
where
    M: Entity<Ident = Uuid>,
{
    pub fn with_uuids() -> Self {
        Self::new(Uuid::now_v7)
    }
}

fn not_found<T>(ident: &impl Display, context: RepoError) -> RepoResult<T> {
    warn!("no entity exists with id {ident}");
    Err(Report::new(NotFound::new(ident))).change_context(context)
}

impl<M, Q> Repository for MemoryRepository<M, Q>
where
    M: Entity,
    Q: QueryMapper<MemoryQuery<M>> + Default + Send,
{
    type Ident = M::Ident;
    type Model = M;
    type Builder = MemoryQuery<M>;
    type Mapper = Q;

    async fn save(&self, mut entity: M) -> RepoResult<M> {
        let mut entities = self.entities.write().await;

        let ident = match entity.ident() {
            Some(ident) => ident.clone(),
            None => {
                let ident = (self.new_id_fn)();
                entity.set_ident(ident.clone());
                ident
            }
        };

        if entities.contains_key(&ident) {
            return Err(Report::new(RepoError::Save))
                .attach_with(|| format!("an entity with id {ident} already exists"));
        }

        debug!("saving entity {ident}");
        entities.insert(ident, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: M) -> RepoResult<M> {
        let ident = entity
            .ident()
            .cloned()
            .ok_or(RepoError::Update)
            .attach("entity has no id, it must be saved before it can be updated")?;

        let mut entities = self.entities.write().await;
        match entities.get_mut(&ident) {
            Some(stored) => {
                debug!("updating entity {ident}");
                *stored = entity.clone();
                Ok(entity)
            }
            None => not_found(&ident, RepoError::Update),
        }
    }

    async fn delete(&self, ident: M::Ident) -> RepoResult<()> {
        match self.entities.write().await.remove(&ident) {
            Some(_) => {
                debug!("deleted entity {ident}");
                Ok(())
            }
            None => not_found(&ident, RepoError::Delete),
        }
    }

    async fn find_by_id(&self, ident: M::Ident) -> RepoResult<M> {
        match self.entities.read().await.get(&ident) {
            Some(entity) => Ok(entity.clone()),
            None => not_found(&ident, RepoError::FindById),
        }
    }

    async fn find_all(&self) -> RepoResult<Vec<M>> {
        Ok(self.entities.read().await.values().cloned().collect())
    }

    async fn find<P>(&self, predicate: P) -> RepoResult<Vec<M>>
    where
        P: FnOnce(&mut Q) + Send,
    {
        let query = {
            let mut mapper = Q::default();
            predicate(&mut mapper);

            let mut query = MemoryQuery::new();
            mapper.apply(&mut query).change_context(RepoError::Find)?;
            query
        };
        debug!("finding entities matching {query}");

        let entities = self.entities.read().await;
        let mut found = Vec::new();
        for entity in entities.values() {
            if query.matches(entity).change_context(RepoError::Find)? {
                found.push(entity.clone());
            }
        }
        Ok(found)
    }
}
