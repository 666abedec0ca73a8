//! In-memory cache implementation with LRU eviction.
//!
//! Entries carry an optional deadline and are expired lazily: an expired
//! entry is dropped the next time it is read or matched by a pattern.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use resumestore_core::cache::{pattern_matches, Cache, Result};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>`. Reads take the write
/// lock because an LRU lookup updates recency.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` values.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Number of live and not yet collected entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                store.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let doomed: Vec<String> = store
            .iter()
            .filter(|(key, entry)| entry.is_expired() || pattern_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in doomed {
            store.pop(&key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumestore_core::cache::{collection_key, entity_key, kind_pattern};
    use resumestore_core::EntityKind;
    use uuid::Uuid;

    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let key = entity_key(EntityKind::Resume, Uuid::new_v4());

        cache.set(&key, b"{}", None).await.unwrap();

        assert_eq!(cache.get(&key).await.unwrap(), Some(b"{}".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert_eq!(cache.get("resume:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("hobby:1", b"chess", None).await.unwrap();
        cache.delete("hobby:1").await.unwrap();

        assert!(cache.get("hobby:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert!(cache.delete("hobby:nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_ttl_expiration_drops_entry() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("template:1", b"v1", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get("template:1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get("template:1").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("template:1", b"v1", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(cache.get("template:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_pattern_by_kind() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        let education = entity_key(EntityKind::Education, Uuid::new_v4());
        let experience = entity_key(EntityKind::Experience, Uuid::new_v4());

        cache.set(&education, b"1", None).await.unwrap();
        cache
            .set(&collection_key(EntityKind::Education), b"[]", None)
            .await
            .unwrap();
        cache.set(&experience, b"2", None).await.unwrap();

        cache
            .delete_pattern(&kind_pattern(EntityKind::Education))
            .await
            .unwrap();

        assert!(cache.get(&education).await.unwrap().is_none());
        assert!(cache
            .get(&collection_key(EntityKind::Education))
            .await
            .unwrap()
            .is_none());
        assert!(cache.get(&experience).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("resume:all", b"first", None).await.unwrap();
        cache.set("resume:all", b"second", None).await.unwrap();

        assert_eq!(
            cache.get("resume:all").await.unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(3);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key2", b"value2", None).await.unwrap();
        cache.set("key3", b"value3", None).await.unwrap();

        // Touch key1 so key2 becomes least recently used.
        cache.get("key1").await.unwrap();
        cache.set("key4", b"value4", None).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_some());
        assert!(cache.get("key2").await.unwrap().is_none());
        assert!(cache.get("key3").await.unwrap().is_some());
        assert!(cache.get("key4").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one_entry() {
        let cache = MemoryCache::new(0);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key2", b"value2", None).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("key2").await.unwrap().is_some());
    }
}
