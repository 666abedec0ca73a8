//! Application state.
//!
//! Wires one storage backend and an optional cache into the services. The
//! services only see repository trait objects, so each backend combination
//! is assembled here and nowhere else.

use std::sync::Arc;
use std::time::Duration;

use resumestore_core::cache::Cache;
use resumestore_core::resume::{ChildEntity, Education, Experience, Hobby, PersonalData, SocialLink};
use resumestore_core::storage::{
    ChildRepository, ChildRetention, ResumeRepository, TemplateRepository,
};

use crate::cache::MemoryCache;
use crate::config::{CacheBackend, Config, StorageBackend};
use crate::services::{ChildService, ResumeService, TemplateService};
use crate::storage::cached::{
    CachedChildRepository, CachedResumeRepository, CachedTemplateRepository,
};
use crate::storage::InMemoryRepository;

/// A repository backend able to serve every service.
pub trait Backend:
    TemplateRepository
    + ResumeRepository
    + ChildRepository<PersonalData>
    + ChildRepository<Education>
    + ChildRepository<Experience>
    + ChildRepository<SocialLink>
    + ChildRepository<Hobby>
    + 'static
{
}

impl<R> Backend for R where
    R: TemplateRepository
        + ResumeRepository
        + ChildRepository<PersonalData>
        + ChildRepository<Education>
        + ChildRepository<Experience>
        + ChildRepository<SocialLink>
        + ChildRepository<Hobby>
        + 'static
{
}

/// Shared application state.
///
/// Cheap to clone; every service holds `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub templates: TemplateService,
    pub resumes: ResumeService,
    pub personal_data: ChildService<PersonalData>,
    pub educations: ChildService<Education>,
    pub experiences: ChildService<Experience>,
    pub social_links: ChildService<SocialLink>,
    pub hobbies: ChildService<Hobby>,
}

impl AppState {
    /// Builds the state described by `config`.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let cache = build_cache(config).await?;
        let ttl = config.cache_ttl();
        let retention = config.child_retention;

        tracing::info!(
            storage = %config.storage_backend,
            cache = %config.cache_backend,
            ?retention,
            "Building application state"
        );

        match config.storage_backend {
            StorageBackend::Memory => Ok(Self::build(
                Arc::new(InMemoryRepository::new()),
                cache,
                ttl,
                retention,
            )),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => {
                let repository =
                    crate::storage::SqliteRepository::new(&config.sqlite_path).await?;
                Ok(Self::build(Arc::new(repository), cache, ttl, retention))
            }
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => {
                anyhow::bail!("SQLite storage requires the `sqlite` feature")
            }
        }
    }

    /// In-memory storage behind an in-memory cache.
    pub fn in_memory(retention: ChildRetention) -> Self {
        Self::build(
            Arc::new(InMemoryRepository::new()),
            Some(Arc::new(MemoryCache::new(10_000))),
            Duration::from_secs(300),
            retention,
        )
    }

    /// Wires `repository` into every service, decorated with `cache` when
    /// one is given.
    pub fn build<R: Backend>(
        repository: Arc<R>,
        cache: Option<Arc<dyn Cache>>,
        ttl: Duration,
        retention: ChildRetention,
    ) -> Self {
        let templates: Arc<dyn TemplateRepository> = match &cache {
            Some(cache) => Arc::new(CachedTemplateRepository::new(
                repository.clone(),
                cache.clone(),
                ttl,
            )),
            None => repository.clone(),
        };
        let resumes: Arc<dyn ResumeRepository> = match &cache {
            Some(cache) => Arc::new(CachedResumeRepository::new(
                repository.clone(),
                cache.clone(),
                ttl,
            )),
            None => repository.clone(),
        };

        Self {
            templates: TemplateService::new(templates),
            resumes: ResumeService::new(resumes, retention),
            personal_data: child_service(&repository, cache.as_ref(), ttl),
            educations: child_service(&repository, cache.as_ref(), ttl),
            experiences: child_service(&repository, cache.as_ref(), ttl),
            social_links: child_service(&repository, cache.as_ref(), ttl),
            hobbies: child_service(&repository, cache.as_ref(), ttl),
        }
    }
}

fn child_service<T, R>(
    repository: &Arc<R>,
    cache: Option<&Arc<dyn Cache>>,
    ttl: Duration,
) -> ChildService<T>
where
    T: ChildEntity,
    R: ChildRepository<T> + 'static,
{
    let repository: Arc<dyn ChildRepository<T>> = match cache {
        Some(cache) => Arc::new(CachedChildRepository::new(
            repository.clone(),
            cache.clone(),
            ttl,
        )),
        None => repository.clone(),
    };
    ChildService::new(repository)
}

async fn build_cache(config: &Config) -> anyhow::Result<Option<Arc<dyn Cache>>> {
    match config.cache_backend {
        CacheBackend::None => Ok(None),
        CacheBackend::Memory => Ok(Some(Arc::new(MemoryCache::new(config.cache_max_entries)))),
        #[cfg(feature = "redis")]
        CacheBackend::Redis => {
            let cache = crate::cache::RedisCache::new(&config.redis_url).await?;
            Ok(Some(Arc::new(cache)))
        }
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => anyhow::bail!("Redis cache requires the `redis` feature"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(storage_backend: StorageBackend, cache_backend: CacheBackend) -> Config {
        Config {
            storage_backend,
            sqlite_path: ":memory:".to_string(),
            cache_backend,
            cache_ttl_seconds: 60,
            cache_max_entries: 100,
            redis_url: "redis://localhost:6379".to_string(),
            child_retention: ChildRetention::Replace,
        }
    }

    #[tokio::test]
    async fn test_memory_state_without_cache() {
        let state = AppState::new(&config(StorageBackend::Memory, CacheBackend::None))
            .await
            .unwrap();

        assert_eq!(state.resumes.retention(), ChildRetention::Replace);
        assert!(state.templates.list_all().await.unwrap().is_empty());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_sqlite_state_with_memory_cache() {
        let state = AppState::new(&config(StorageBackend::Sqlite, CacheBackend::Memory))
            .await
            .unwrap();

        let hobby = state.hobbies.create(Hobby::new("chess")).await.unwrap();

        assert_eq!(state.hobbies.get(hobby.id).await.unwrap(), hobby);
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn test_redis_without_feature_is_an_error() {
        let result = AppState::new(&config(StorageBackend::Memory, CacheBackend::Redis)).await;
        assert!(result.is_err());
    }
}
