//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `resumestore_core::storage`, plus the cache-aside decorators
//! that wrap them.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//!
//! The in-memory backend is always available.
//!
//! # Examples
//!
//! Build without SQLite:
//! ```bash
//! cargo build -p resumestore --no-default-features
//! ```

pub mod cached;
pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
