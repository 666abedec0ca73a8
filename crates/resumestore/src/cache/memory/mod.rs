//! In-memory cache backend.
//!
//! Single-process LRU cache with per-entry TTL.

mod cache;

pub use cache::MemoryCache;
