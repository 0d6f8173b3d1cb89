//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid phone number format
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Invalid messaging account id
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
