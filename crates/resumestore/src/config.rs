use std::{env, fmt, str::FromStr, time::Duration};

use resumestore_core::storage::ChildRetention;

/// Where records are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl Default for StorageBackend {
    fn default() -> Self {
        if cfg!(feature = "sqlite") {
            StorageBackend::Sqlite
        } else {
            StorageBackend::Memory
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Which cache sits in front of the repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
    None,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            "none" => Ok(CacheBackend::None),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::Redis => write!(f, "redis"),
            CacheBackend::None => write!(f, "none"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend (default: sqlite when the feature is enabled)
    pub storage_backend: StorageBackend,
    /// Path to SQLite database file (default: "resumestore.db")
    pub sqlite_path: String,
    /// Cache backend (default: memory)
    pub cache_backend: CacheBackend,
    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    pub redis_url: String,
    /// What happens to children a resume update omits (default: retain)
    pub child_retention: ChildRetention,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STORAGE_BACKEND` - `memory` or `sqlite`
    /// - `SQLITE_PATH` - SQLite database path (default: "resumestore.db")
    /// - `CACHE_BACKEND` - `memory`, `redis` or `none` (default: memory)
    /// - `CACHE_TTL_SECONDS` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `CHILD_RETENTION` - `retain` or `replace` (default: retain)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            storage_backend: parse_env("STORAGE_BACKEND").unwrap_or_default(),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "resumestore.db".to_string()),
            cache_backend: parse_env("CACHE_BACKEND").unwrap_or_default(),
            cache_ttl_seconds: parse_env("CACHE_TTL_SECONDS").unwrap_or(300),
            cache_max_entries: parse_env("CACHE_MAX_ENTRIES").unwrap_or(10_000),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            child_retention: parse_env("CHILD_RETENTION").unwrap_or_default(),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, "Ignoring invalid configuration value");
            None
        }
    }
}
