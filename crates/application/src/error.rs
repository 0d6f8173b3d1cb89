//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Phone or message missing from a send request
    #[error("phone and message are required")]
    MissingPhoneOrMessage,

    /// Phone number could not be normalized
    #[error("Invalid phone number after normalization: {0}")]
    InvalidPhone(String),

    /// The number has no WhatsApp account
    #[error("{phone} is not a WhatsApp user")]
    NotAWhatsAppUser {
        /// Normalized phone number
        phone: String,
    },

    /// The WhatsApp session cannot send yet
    #[error("WhatsApp session is not ready")]
    NotReady,

    /// Credentials were rejected
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    ///
    /// Only a not-ready session clears up on its own. Sends are never
    /// retried internally.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady)
    }

    /// Create a not-a-user error
    pub fn not_a_user(phone: impl Into<String>) -> Self {
        Self::NotAWhatsAppUser {
            phone: phone.into(),
        }
    }
}
