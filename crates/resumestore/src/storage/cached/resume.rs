//! Cached resume repository decorator.
//!
//! Wraps a `ResumeRepository` implementation with cache-aside pattern. A
//! resume write touches its children too, so every write evicts the child
//! entries it may have changed along with their collections.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use resumestore_core::cache::{collection_key, entity_key, kind_pattern, resume_key, Cache};
use resumestore_core::resume::Resume;
use resumestore_core::storage::{ChildRetention, Page, PageRequest, Result, ResumeRepository};
use resumestore_core::EntityKind;

use super::{cache_evict, cache_evict_pattern, cache_get, cache_set};

/// Cached resume repository decorator.
///
/// Composed aggregates are cached under `resume:{id}` and the full listing
/// under `resume:all`. Name filters and searches always go to the repository.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation
pub struct CachedResumeRepository<R, C>
where
    R: ResumeRepository + ?Sized,
    C: Cache + ?Sized,
{
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<R, C> CachedResumeRepository<R, C>
where
    R: ResumeRepository + ?Sized,
    C: Cache + ?Sized,
{
    /// Creates a new cached resume repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - The cache implementation
    /// * `ttl` - Time-to-live for cached resumes
    pub fn new(repository: Arc<R>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            repository,
            cache,
            ttl,
        }
    }

    /// Evicts the given children and the collections of every child kind.
    async fn evict_children(&self, children: impl IntoIterator<Item = (EntityKind, Uuid)>) {
        let unique: HashSet<(EntityKind, Uuid)> = children.into_iter().collect();
        for (kind, id) in unique {
            cache_evict(&*self.cache, &entity_key(kind, id)).await;
        }
        for kind in EntityKind::RESUME_CHILDREN {
            cache_evict(&*self.cache, &collection_key(kind)).await;
        }
        cache_evict(&*self.cache, &collection_key(EntityKind::Resume)).await;
    }
}

#[async_trait]
impl<R, C> ResumeRepository for CachedResumeRepository<R, C>
where
    R: ResumeRepository + ?Sized + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>> {
        let key = resume_key(id);
        if let Some(resume) = cache_get(&*self.cache, &key).await {
            return Ok(Some(resume));
        }

        let resume = self.repository.get_resume(id).await?;
        if let Some(ref r) = resume {
            cache_set(&*self.cache, &key, r, self.ttl).await;
        }
        Ok(resume)
    }

    async fn list_resumes(&self) -> Result<Vec<Resume>> {
        let key = collection_key(EntityKind::Resume);
        if let Some(resumes) = cache_get(&*self.cache, &key).await {
            return Ok(resumes);
        }

        let resumes = self.repository.list_resumes().await?;
        cache_set(&*self.cache, &key, &resumes, self.ttl).await;
        Ok(resumes)
    }

    async fn find_resumes_by_name(&self, fragment: &str) -> Result<Vec<Resume>> {
        self.repository.find_resumes_by_name(fragment).await
    }

    async fn search_resumes(&self, query: &str, page: PageRequest) -> Result<Page<Resume>> {
        self.repository.search_resumes(query, page).await
    }

    async fn save_resume(&self, resume: &Resume, retention: ChildRetention) -> Result<()> {
        // Children dropped by this save are only known from the previous state.
        let previous = self.repository.get_resume(resume.id).await?;

        self.repository.save_resume(resume, retention).await?;

        // The write is committed; a failed re-read only drops the entry.
        let key = resume_key(resume.id);
        match self.repository.get_resume(resume.id).await {
            Ok(Some(stored)) => cache_set(&*self.cache, &key, &stored, self.ttl).await,
            Ok(None) => cache_evict(&*self.cache, &key).await,
            Err(err) => {
                tracing::warn!(resume_id = %resume.id, error = %err, "Re-read after save failed");
                cache_evict(&*self.cache, &key).await;
            }
        }

        let touched = previous
            .iter()
            .flat_map(Resume::child_ids)
            .chain(resume.child_ids());
        self.evict_children(touched).await;

        tracing::debug!(
            resume_id = %resume.id,
            full_name = %resume.personal_data.full_name,
            ?retention,
            "Resume saved"
        );
        Ok(())
    }

    async fn delete_resume(&self, id: Uuid) -> Result<()> {
        let previous = self.repository.get_resume(id).await?;

        self.repository.delete_resume(id).await?;

        cache_evict(&*self.cache, &resume_key(id)).await;
        self.evict_children(previous.iter().flat_map(Resume::child_ids))
            .await;

        tracing::debug!(resume_id = %id, "Resume deleted");
        Ok(())
    }

    async fn delete_all_resumes(&self) -> Result<u64> {
        let deleted = self.repository.delete_all_resumes().await?;

        cache_evict_pattern(&*self.cache, &kind_pattern(EntityKind::Resume)).await;
        for kind in EntityKind::RESUME_CHILDREN {
            cache_evict_pattern(&*self.cache, &kind_pattern(kind)).await;
        }

        tracing::debug!(deleted, "All resumes deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use resumestore_core::cache::serialize_value;
    use std::sync::atomic::{AtomicBool, Ordering};

    use resumestore_core::resume::{Education, Hobby, PersonalData};
    use resumestore_core::storage::RepositoryError;

    use crate::storage::cached::test_support::{FailingCache, MockCache};
    use crate::storage::InMemoryRepository;

    fn sample_resume() -> Resume {
        let mut resume = Resume::new(PersonalData::new("John Doe"))
            .with_education(Education::new("MIT", "2020", "2022"))
            .with_hobby(Hobby::new("chess"));
        resume.claim_children();
        resume
    }

    /// Serves reads normally until the first save, then fails them.
    struct FailingRereads {
        inner: InMemoryRepository,
        saved: AtomicBool,
    }

    #[async_trait]
    impl ResumeRepository for FailingRereads {
        async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>> {
            if self.saved.load(Ordering::SeqCst) {
                return Err(RepositoryError::ConnectionFailed("database unavailable".to_string()));
            }
            self.inner.get_resume(id).await
        }

        async fn list_resumes(&self) -> Result<Vec<Resume>> {
            self.inner.list_resumes().await
        }

        async fn find_resumes_by_name(&self, fragment: &str) -> Result<Vec<Resume>> {
            self.inner.find_resumes_by_name(fragment).await
        }

        async fn search_resumes(&self, query: &str, page: PageRequest) -> Result<Page<Resume>> {
            self.inner.search_resumes(query, page).await
        }

        async fn save_resume(&self, resume: &Resume, retention: ChildRetention) -> Result<()> {
            self.inner.save_resume(resume, retention).await?;
            self.saved.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn delete_resume(&self, id: Uuid) -> Result<()> {
            self.inner.delete_resume(id).await
        }

        async fn delete_all_resumes(&self) -> Result<u64> {
            self.inner.delete_all_resumes().await
        }
    }

    fn cached(
        repo: &Arc<InMemoryRepository>,
        cache: &Arc<MockCache>,
    ) -> CachedResumeRepository<InMemoryRepository, MockCache> {
        CachedResumeRepository::new(repo.clone(), cache.clone(), Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_get_resume_is_read_through() {
        let resume = sample_resume();
        let repo = Arc::new(InMemoryRepository::new());
        repo.save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        let cache = Arc::new(MockCache::new());
        let cached = cached(&repo, &cache);

        assert_eq!(cached.get_resume(resume.id).await.unwrap(), Some(resume.clone()));
        assert!(cache.contains(&resume_key(resume.id)).await);

        // A seeded entry is served without touching the repository.
        let mut seeded = resume.clone();
        seeded.personal_data.full_name = "From Cache".to_string();
        cache
            .set(&resume_key(resume.id), &serialize_value(&seeded).unwrap(), None)
            .await
            .unwrap();
        let hit = cached.get_resume(resume.id).await.unwrap().unwrap();
        assert_eq!(hit.personal_data.full_name, "From Cache");
    }

    #[tokio::test]
    async fn test_save_writes_through_composed_aggregate() {
        let resume = sample_resume();
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached = cached(&repo, &cache);
        cached
            .save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();

        // An update that omits the hobby keeps it under Retain.
        let mut update = resume.clone();
        update.hobbies.clear();
        update.personal_data.full_name = "Johnny Doe".to_string();
        cached
            .save_resume(&update, ChildRetention::Retain)
            .await
            .unwrap();

        let bytes = cache.store.read().await[&resume_key(resume.id)].clone();
        let stored: Resume = resumestore_core::cache::deserialize_value(&bytes).unwrap();
        assert_eq!(stored.personal_data.full_name, "Johnny Doe");
        assert_eq!(stored.hobbies, resume.hobbies);
    }

    #[tokio::test]
    async fn test_save_evicts_touched_children_and_collections() {
        let resume = sample_resume();
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let hobby_key = entity_key(EntityKind::Hobby, resume.hobbies[0].id);
        for key in [
            hobby_key.clone(),
            collection_key(EntityKind::Education),
            collection_key(EntityKind::Resume),
        ] {
            cache.set(&key, b"[]", None).await.unwrap();
        }
        let cached = cached(&repo, &cache);

        cached
            .save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();

        assert!(!cache.contains(&hobby_key).await);
        assert!(!cache.contains(&collection_key(EntityKind::Education)).await);
        assert!(!cache.contains(&collection_key(EntityKind::Resume)).await);
    }

    #[tokio::test]
    async fn test_replace_evicts_dropped_children() {
        let resume = sample_resume();
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached = cached(&repo, &cache);
        cached
            .save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        let hobby_key = entity_key(EntityKind::Hobby, resume.hobbies[0].id);
        cache.set(&hobby_key, b"{}", None).await.unwrap();

        let mut update = resume.clone();
        update.hobbies.clear();
        cached
            .save_resume(&update, ChildRetention::Replace)
            .await
            .unwrap();

        assert!(!cache.contains(&hobby_key).await);
        let stored = cached.get_resume(resume.id).await.unwrap().unwrap();
        assert!(stored.hobbies.is_empty());
    }

    #[tokio::test]
    async fn test_delete_resume_evicts_aggregate_and_children() {
        let resume = sample_resume();
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached = cached(&repo, &cache);
        cached
            .save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        let education_key = entity_key(EntityKind::Education, resume.educations[0].id);
        cache.set(&education_key, b"{}", None).await.unwrap();
        cached.list_resumes().await.unwrap();

        cached.delete_resume(resume.id).await.unwrap();

        assert!(!cache.contains(&resume_key(resume.id)).await);
        assert!(!cache.contains(&education_key).await);
        assert!(!cache.contains(&collection_key(EntityKind::Resume)).await);
        assert!(cached.get_resume(resume.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_clears_resume_and_child_keys() {
        let resume = sample_resume();
        let repo = Arc::new(InMemoryRepository::new());
        let cache = Arc::new(MockCache::new());
        let cached = cached(&repo, &cache);
        cached
            .save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        cache
            .set(&collection_key(EntityKind::Hobby), b"[]", None)
            .await
            .unwrap();

        assert_eq!(cached.delete_all_resumes().await.unwrap(), 1);

        assert!(cache.store.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_failing_cache_does_not_break_operations() {
        let resume = sample_resume();
        let repo = Arc::new(InMemoryRepository::new());
        let cached = CachedResumeRepository::new(
            repo.clone(),
            Arc::new(FailingCache),
            Duration::from_secs(300),
        );

        cached
            .save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();
        assert_eq!(cached.get_resume(resume.id).await.unwrap(), Some(resume.clone()));
        assert_eq!(cached.list_resumes().await.unwrap().len(), 1);
        cached.delete_resume(resume.id).await.unwrap();
        assert_eq!(cached.delete_all_resumes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_resume_survives_failed_reread() {
        let resume = sample_resume();
        let repo = Arc::new(FailingRereads {
            inner: InMemoryRepository::new(),
            saved: AtomicBool::new(false),
        });
        let cache = Arc::new(MockCache::new());
        let key = resume_key(resume.id);
        cache
            .set(&key, &serialize_value(&resume).unwrap(), None)
            .await
            .unwrap();
        let cached =
            CachedResumeRepository::new(repo.clone(), cache.clone(), Duration::from_secs(300));

        cached
            .save_resume(&resume, ChildRetention::Retain)
            .await
            .unwrap();

        assert!(!cache.contains(&key).await);
        assert_eq!(repo.inner.list_resumes().await.unwrap(), vec![resume]);
    }
}
