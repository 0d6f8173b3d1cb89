//! Domain entities

mod outbound;
mod send_request;

pub use outbound::{MediaAttachment, PDF_MIME_TYPE, SendOutcome};
pub use send_request::SendRequest;
