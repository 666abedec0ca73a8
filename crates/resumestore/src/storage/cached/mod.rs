//! Cached repository decorators.
//!
//! This module provides decorator implementations that wrap repository traits
//! with caching behavior. The decorators implement the cache-aside pattern:
//!
//! - **Reads**: Check cache first, on miss fetch from repository and populate cache
//! - **Writes**: Persist to repository, then refresh or evict the affected keys
//!
//! Cache failures never fail a repository call. They are logged and the
//! decorator falls back to the wrapped repository.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let repo = Arc::new(SqliteRepository::new("resumestore.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let resumes = CachedResumeRepository::new(repo, cache, Duration::from_secs(300));
//! ```

mod child;
mod resume;
mod template;

pub use child::CachedChildRepository;
pub use resume::CachedResumeRepository;
pub use template::CachedTemplateRepository;

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use resumestore_core::cache::{deserialize_value, serialize_value, Cache};

/// Reads and decodes a cached value. Any failure counts as a miss.
async fn cache_get<C, T>(cache: &C, key: &str) -> Option<T>
where
    C: Cache + ?Sized,
    T: DeserializeOwned,
{
    match cache.get(key).await {
        Ok(Some(bytes)) => match deserialize_value(&bytes) {
            Ok(value) => {
                tracing::trace!(%key, "Cache hit");
                Some(value)
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "Cache deserialization failed");
                None
            }
        },
        Ok(None) => {
            tracing::trace!(%key, "Cache miss");
            None
        }
        Err(err) => {
            tracing::warn!(%key, error = %err, "Cache read failed");
            None
        }
    }
}

async fn cache_set<C, T>(cache: &C, key: &str, value: &T, ttl: Duration)
where
    C: Cache + ?Sized,
    T: Serialize + ?Sized,
{
    match serialize_value(value) {
        Ok(bytes) => {
            if let Err(err) = cache.set(key, &bytes, Some(ttl)).await {
                tracing::warn!(%key, error = %err, "Failed to populate cache");
            }
        }
        Err(err) => tracing::warn!(%key, error = %err, "Cache serialization failed"),
    }
}

async fn cache_evict<C>(cache: &C, key: &str)
where
    C: Cache + ?Sized,
{
    if let Err(err) = cache.delete(key).await {
        tracing::warn!(%key, error = %err, "Failed to invalidate cache");
    }
}

async fn cache_evict_pattern<C>(cache: &C, pattern: &str)
where
    C: Cache + ?Sized,
{
    if let Err(err) = cache.delete_pattern(pattern).await {
        tracing::warn!(%pattern, error = %err, "Failed to invalidate cache pattern");
    }
}
