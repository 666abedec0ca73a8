//! Application services.
//!
//! Services validate input, enforce uniqueness and ownership rules, and
//! delegate persistence to the repository traits. They hold trait objects,
//! so the same service runs over any backend with or without a cache.

mod child;
mod error;
mod resume;
mod template;

pub use child::ChildService;
pub use error::{parse_id, Result, ServiceError};
pub use resume::ResumeService;
pub use template::TemplateService;
