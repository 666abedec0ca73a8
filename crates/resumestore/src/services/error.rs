//! Service-level errors.
//!
//! Every failure a service reports is one of four kinds. Validation and
//! uniqueness problems never reach storage as partial writes.

use thiserror::Error;
use uuid::Uuid;

use resumestore_core::resume::ResumeError;
use resumestore_core::storage::{
    repository_error_to_status_code, DateRangeError, PageRequestError, RepositoryError,
};
use resumestore_core::template::TemplateError;

/// Errors returned by the services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(RepositoryError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Maps the error kind to an HTTP-style status code for adapters.
    ///
    /// - `InvalidArgument` -> 400
    /// - `NotFound` -> 404
    /// - `Conflict` -> 409
    /// - `Storage` -> 500, or 503 when the backend is unreachable
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidArgument(_) => 400,
            ServiceError::NotFound { .. } => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Storage(err) => repository_error_to_status_code(err),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            RepositoryError::AlreadyExists { .. } => Self::Conflict(err.to_string()),
            RepositoryError::InvalidData(msg) => Self::InvalidArgument(msg),
            other => Self::Storage(other),
        }
    }
}

impl From<TemplateError> for ServiceError {
    fn from(err: TemplateError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<ResumeError> for ServiceError {
    fn from(err: ResumeError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<PageRequestError> for ServiceError {
    fn from(err: PageRequestError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<DateRangeError> for ServiceError {
    fn from(err: DateRangeError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Parses an entity id supplied by an adapter.
pub fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| ServiceError::InvalidArgument(format!("Malformed id: {value:?}")))
}
