//! In-memory storage backend.
//!
//! Every table lives behind one `Arc<RwLock<_>>` so a cascading write holds a
//! single write lock for its whole unit. Data is lost when the repository is
//! dropped; useful for tests and for `STORAGE_BACKEND=memory`.
//!
//! # Example
//!
//! ```rust,ignore
//! use resumestore::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! ```

mod repository;
mod table;

pub use repository::InMemoryRepository;
