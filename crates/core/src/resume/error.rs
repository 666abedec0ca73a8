use thiserror::Error;

/// Errors that can occur when validating a resume or one of its children.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResumeError {
    #[error("Full name too short (min {min} characters)")]
    FullNameTooShort { min: usize },
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },
    #[error("Invalid year: {0:?}")]
    InvalidYear(String),
    #[error("From year {from} must be before to year {to}")]
    InvalidYearRange { from: i32, to: i32 },
    #[error("Search query too long (max {max} characters)")]
    QueryTooLong { max: usize },
}
