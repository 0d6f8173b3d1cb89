//! Messaging client port - the WhatsApp connection the relay drives
//!
//! Adapters wrap a concrete gateway. The relay only needs the session
//! status, a way to (re)initialize it, account lookup and two send kinds.

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use domain::{AccountId, ConnectionStatus, MediaAttachment, PhoneNumber};

use crate::error::ApplicationError;

/// Port for the external WhatsApp client
///
/// Gateways that reject their credentials must report
/// [`ApplicationError::NotAuthorized`] so the session can surface an
/// auth failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagingClientPort: Send + Sync {
    /// Current connection status of the session
    async fn connection_status(&self) -> Result<ConnectionStatus, ApplicationError>;

    /// Start or resume the session
    ///
    /// Returns a pairing code when the phone has to scan one.
    async fn initialize(&self) -> Result<Option<String>, ApplicationError>;

    /// Resolve a normalized phone number to its account id
    ///
    /// `None` means the number is not registered on WhatsApp.
    async fn resolve_account(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<AccountId>, ApplicationError>;

    /// Send a text message, returning the platform message id
    async fn send_text(&self, to: &AccountId, text: &str) -> Result<String, ApplicationError>;

    /// Send a file with a caption, returning the platform message id
    async fn send_media(
        &self,
        to: &AccountId,
        media: &MediaAttachment,
        caption: &str,
    ) -> Result<String, ApplicationError>;
}
