//! Redis cache backend implementation.
//!
//! Shared cache for deployments running several store processes.

mod cache;
mod error;

pub use cache::RedisCache;
