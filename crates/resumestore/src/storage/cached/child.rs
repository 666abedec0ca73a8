//! Cached child repository decorator.
//!
//! One generic decorator serves every child kind. Writes to an owned child
//! also evict the owning resume, since the cached aggregate embeds it.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use resumestore_core::cache::{collection_key, entity_key, resume_key, Cache};
use resumestore_core::resume::ChildEntity;
use resumestore_core::storage::{ChildRepository, Result};
use resumestore_core::EntityKind;

use super::{cache_evict, cache_get, cache_set};

/// Cached child repository decorator.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
/// * `T` - The child kind
pub struct CachedChildRepository<R, C, T>
where
    R: ChildRepository<T> + ?Sized,
    C: Cache + ?Sized,
    T: ChildEntity,
{
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
    _kind: PhantomData<fn() -> T>,
}

impl<R, C, T> CachedChildRepository<R, C, T>
where
    R: ChildRepository<T> + ?Sized,
    C: Cache + ?Sized,
    T: ChildEntity,
{
    /// Creates a new cached child repository.
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
            _kind: PhantomData,
        }
    }

    async fn evict_owner(&self, owner: Option<Uuid>) {
        if let Some(resume_id) = owner {
            cache_evict(&*self.cache, &resume_key(resume_id)).await;
            cache_evict(&*self.cache, &collection_key(EntityKind::Resume)).await;
        }
    }

    async fn evict_collection(&self) {
        cache_evict(&*self.cache, &collection_key(T::KIND)).await;
    }
}

#[async_trait]
impl<R, C, T> ChildRepository<T> for CachedChildRepository<R, C, T>
where
    R: ChildRepository<T> + ?Sized + 'static,
    C: Cache + ?Sized + 'static,
    T: ChildEntity,
{
    async fn get_child(&self, id: Uuid) -> Result<Option<T>> {
        let key = entity_key(T::KIND, id);
        if let Some(child) = cache_get(&*self.cache, &key).await {
            return Ok(Some(child));
        }

        let child = self.repository.get_child(id).await?;
        if let Some(ref c) = child {
            cache_set(&*self.cache, &key, c, self.ttl).await;
        }
        Ok(child)
    }

    async fn list_children(&self) -> Result<Vec<T>> {
        let key = collection_key(T::KIND);
        if let Some(children) = cache_get(&*self.cache, &key).await {
            return Ok(children);
        }

        let children = self.repository.list_children().await?;
        cache_set(&*self.cache, &key, &children, self.ttl).await;
        Ok(children)
    }

    async fn find_children_by_name(&self, fragment: &str) -> Result<Vec<T>> {
        self.repository.find_children_by_name(fragment).await
    }

    async fn create_child(&self, child: &T) -> Result<()> {
        self.repository.create_child(child).await?;

        cache_set(&*self.cache, &entity_key(T::KIND, child.id()), child, self.ttl).await;
        self.evict_collection().await;
        self.evict_owner(child.resume_id()).await;

        tracing::debug!(kind = %T::KIND, id = %child.id(), "Child created");
        Ok(())
    }

    async fn update_child(&self, child: &T) -> Result<()> {
        self.repository.update_child(child).await?;

        // The stored row keeps its owner, which the request may not carry.
        let key = entity_key(T::KIND, child.id());
        let stored = self.repository.get_child(child.id()).await?;
        match stored {
            Some(ref s) => cache_set(&*self.cache, &key, s, self.ttl).await,
            None => cache_evict(&*self.cache, &key).await,
        }
        self.evict_collection().await;
        self.evict_owner(stored.and_then(|s| s.resume_id())).await;

        tracing::debug!(kind = %T::KIND, id = %child.id(), "Child updated");
        Ok(())
    }

    async fn delete_child(&self, id: Uuid) -> Result<()> {
        let owner = self
            .repository
            .get_child(id)
            .await?
            .and_then(|c| c.resume_id());

        self.repository.delete_child(id).await?;

        cache_evict(&*self.cache, &entity_key(T::KIND, id)).await;
        self.evict_collection().await;
        self.evict_owner(owner).await;

        tracing::debug!(kind = %T::KIND, %id, "Child deleted");
        Ok(())
    }
}
