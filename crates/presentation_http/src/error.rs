//! API error handling
//!
//! Every failure is answered with `{ ok: false, error }`. Client mistakes
//! carry a stable snake_case code; dispatch failures carry the underlying
//! message text.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Shared secret missing or wrong
    #[error("unauthorized")]
    Unauthorized,

    /// Phone or message absent after trimming
    #[error("missing_phone_or_message")]
    MissingPhoneOrMessage,

    /// Phone left no usable digits
    #[error("invalid_phone_after_normalize")]
    InvalidPhone,

    /// Normalized number has no WhatsApp account
    #[error("not_whatsapp_user")]
    NotWhatsAppUser {
        /// Normalized phone number
        phone: String,
    },

    /// WhatsApp session is not ready
    #[error("whatsapp_not_ready")]
    NotReady,

    /// Download or dispatch failure, carrying its message
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingPhoneOrMessage | Self::InvalidPhone | Self::NotWhatsAppUser { .. } => {
                StatusCode::BAD_REQUEST
            },
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub ok: bool,
    /// Error code, or the failure message for internal errors
    pub error: String,
    /// Normalized phone number, for `not_whatsapp_user`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();
        let phone = match self {
            Self::NotWhatsAppUser { phone } => Some(phone),
            _ => None,
        };

        let body = ErrorResponse {
            ok: false,
            error,
            phone,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::NotReady => Self::NotReady,
            ApplicationError::MissingPhoneOrMessage => Self::MissingPhoneOrMessage,
            ApplicationError::InvalidPhone(_) => Self::InvalidPhone,
            ApplicationError::NotAWhatsAppUser { phone } => Self::NotWhatsAppUser { phone },
            ApplicationError::ExternalService(msg)
            | ApplicationError::Configuration(msg)
            | ApplicationError::Internal(msg) => Self::Internal(msg),
            other @ (ApplicationError::Domain(_) | ApplicationError::NotAuthorized(_)) => {
                Self::Internal(other.to_string())
            },
        }
    }
}
