//! Functional core for the resumestore project.
//!
//! Pure domain types, validation, and the storage and cache contracts.
//! Nothing in this crate performs I/O; backends live in the `resumestore` crate.

pub mod cache;
pub mod kind;
pub mod resume;
pub mod storage;
pub mod template;

pub use kind::EntityKind;
