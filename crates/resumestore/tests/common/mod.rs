#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;

use resumestore::config::{CacheBackend, StorageBackend};
use resumestore::{AppState, Config};
use resumestore_core::cache::{Cache, CacheError};
use resumestore_core::resume::{Education, Experience, Hobby, PersonalData, Resume, SocialLink};
use resumestore_core::storage::ChildRetention;

pub fn config(storage_backend: StorageBackend, cache_backend: CacheBackend) -> Config {
    Config {
        storage_backend,
        sqlite_path: ":memory:".to_string(),
        cache_backend,
        cache_ttl_seconds: 60,
        cache_max_entries: 1_000,
        redis_url: "redis://localhost:6379".to_string(),
        child_retention: ChildRetention::Retain,
    }
}

/// Every locally available backend combination, labelled for assertions.
pub async fn states(retention: ChildRetention) -> Vec<(String, AppState)> {
    let mut combos = vec![
        (StorageBackend::Memory, CacheBackend::None),
        (StorageBackend::Memory, CacheBackend::Memory),
    ];
    if cfg!(feature = "sqlite") {
        combos.push((StorageBackend::Sqlite, CacheBackend::None));
        combos.push((StorageBackend::Sqlite, CacheBackend::Memory));
    }

    let mut states = Vec::new();
    for (storage, cache) in combos {
        let mut config = config(storage, cache);
        config.child_retention = retention;
        let state = AppState::new(&config).await.unwrap();
        states.push((format!("{storage}+{cache}"), state));
    }
    states
}

pub fn john() -> Resume {
    Resume::new(
        PersonalData::new("John Doe")
            .with_position("Backend Developer")
            .with_email("john@example.com"),
    )
    .with_education(Education::new("MIT", "2012", "2016"))
    .with_experience(Experience::new("Acme", "2016", "2020"))
    .with_social_link(SocialLink::new("GitHub", "https://github.com/john"))
    .with_hobby(Hobby::new("chess"))
}

/// A cache whose every operation fails.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> resumestore_core::cache::Result<Option<Vec<u8>>> {
        Err(CacheError::ConnectionFailed("unreachable".to_string()))
    }

    async fn set(
        &self,
        _key: &str,
        _value: &[u8],
        _ttl: Option<Duration>,
    ) -> resumestore_core::cache::Result<()> {
        Err(CacheError::ConnectionFailed("unreachable".to_string()))
    }

    async fn delete(&self, _key: &str) -> resumestore_core::cache::Result<()> {
        Err(CacheError::ConnectionFailed("unreachable".to_string()))
    }

    async fn delete_pattern(&self, _pattern: &str) -> resumestore_core::cache::Result<()> {
        Err(CacheError::ConnectionFailed("unreachable".to_string()))
    }
}
