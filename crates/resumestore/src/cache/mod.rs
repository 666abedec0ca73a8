//! Cache backend implementations.
//!
//! Concrete implementations of `resumestore_core::cache::Cache`.
//!
//! # Feature Flags
//!
//! - `redis`: Redis cache using the redis crate
//!
//! The in-memory LRU cache is always compiled in. The backend is chosen at
//! startup from `CACHE_BACKEND`.

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
