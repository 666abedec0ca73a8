//! Transport status codes for repository errors.
//!
//! Adapters (an HTTP layer, the CLI exit path) use these codes to report
//! storage failures without matching on the variants themselves.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP-style status code.
///
/// - `NotFound` -> 404
/// - `AlreadyExists` -> 409
/// - `ConnectionFailed` -> 503
/// - `QueryFailed`, `Serialization` -> 500
/// - `InvalidData` -> 400
///
/// # Examples
///
/// ```
/// use resumestore_core::storage::{repository_error_to_status_code, RepositoryError};
///
/// let error = RepositoryError::AlreadyExists {
///     entity_type: "Template",
///     id: "classic v2".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 409);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}
