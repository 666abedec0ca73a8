//! Redis cache implementation.
//!
//! Values are stored with `SET EX`. Pattern deletion walks the keyspace with
//! `SCAN MATCH` so it never blocks the server the way `KEYS` would.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;

use resumestore_core::cache::{Cache, Result};

use super::error::map_redis_error;

/// Keys deleted per `DEL` round trip during pattern deletion.
const DELETE_BATCH: usize = 500;

/// Redis cache backend using connection manager for pooling.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        let mut scan_conn = self.conn.clone();
        let keys: Vec<String> = scan_conn
            .scan_match::<_, String>(pattern)
            .await
            .map_err(map_redis_error)?
            .collect()
            .await;

        if keys.is_empty() {
            return Ok(());
        }

        tracing::trace!(pattern = %pattern, count = keys.len(), "Deleting keys by pattern");

        let mut conn = self.conn.clone();
        for batch in keys.chunks(DELETE_BATCH) {
            conn.del::<_, ()>(batch).await.map_err(map_redis_error)?;
        }

        Ok(())
    }
}
