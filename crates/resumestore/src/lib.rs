//! resumestore: a versioned template store and resume aggregate persistence.
//!
//! - [`services`] hold the business rules and are what adapters call.
//! - [`storage`] provides the in-memory and SQLite repositories plus the
//!   cache-aside decorators.
//! - [`cache`] provides the in-memory LRU cache and, behind the `redis`
//!   feature, a Redis cache.
//! - [`state::AppState`] wires a configured combination together.

pub mod cache;
pub mod config;
pub mod services;
pub mod state;
pub mod storage;

pub use config::Config;
pub use state::AppState;
