use thiserror::Error;

/// Errors that can occur when validating templates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template name cannot be empty")]
    EmptyName,
    #[error("Template name too long (max {max} characters)")]
    NameTooLong { max: usize },
}
