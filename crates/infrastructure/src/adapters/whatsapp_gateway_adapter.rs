//! WhatsApp gateway adapter
//!
//! Implements the `MessagingClientPort` trait using the WhatsApp integration crate.

use application::error::ApplicationError;
use application::ports::MessagingClientPort;
use async_trait::async_trait;
use domain::{AccountId, ConnectionStatus, MediaAttachment, PhoneNumber};
use integration_whatsapp::{WhatsAppClient, WhatsAppClientConfig, WhatsAppError};
use tracing::{debug, instrument};

/// Account id suffix for personal WhatsApp accounts
const USER_SERVER: &str = "@s.whatsapp.net";

/// Adapter that implements `MessagingClientPort` using `WhatsAppClient`
#[derive(Debug, Clone)]
pub struct WhatsAppGatewayAdapter {
    client: WhatsAppClient,
}

impl WhatsAppGatewayAdapter {
    /// Create a new gateway adapter
    ///
    /// # Errors
    /// Returns an error if the client configuration is invalid.
    pub fn new(config: WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        Ok(Self {
            client: WhatsAppClient::new(config)?,
        })
    }
}

fn map_error(context: &str, error: WhatsAppError) -> ApplicationError {
    match error {
        WhatsAppError::Unauthorized(message) => ApplicationError::NotAuthorized(message),
        WhatsAppError::Configuration(message) => ApplicationError::Configuration(message),
        other => ApplicationError::ExternalService(format!("{context}: {other}")),
    }
}

#[async_trait]
impl MessagingClientPort for WhatsAppGatewayAdapter {
    async fn connection_status(&self) -> Result<ConnectionStatus, ApplicationError> {
        self.client
            .connection_state()
            .await
            .map_err(|e| map_error("WhatsApp status check failed", e))
    }

    #[instrument(skip(self), fields(instance = %self.client.instance()))]
    async fn initialize(&self) -> Result<Option<String>, ApplicationError> {
        self.client
            .connect()
            .await
            .map_err(|e| map_error("WhatsApp initialization failed", e))
    }

    #[instrument(skip(self), fields(phone = %phone))]
    async fn resolve_account(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<AccountId>, ApplicationError> {
        let checks = self
            .client
            .check_numbers(&[phone.as_str()])
            .await
            .map_err(|e| map_error("WhatsApp number lookup failed", e))?;

        let Some(check) = checks.into_iter().find(|c| c.exists) else {
            debug!("Number has no WhatsApp account");
            return Ok(None);
        };

        let jid = check
            .jid
            .filter(|jid| !jid.is_empty())
            .unwrap_or_else(|| format!("{phone}{USER_SERVER}"));
        Ok(Some(AccountId::new(jid)?))
    }

    #[instrument(skip(self, text), fields(to = %to))]
    async fn send_text(&self, to: &AccountId, text: &str) -> Result<String, ApplicationError> {
        self.client
            .send_text(to.as_str(), text)
            .await
            .map_err(|e| map_error("WhatsApp send failed", e))
    }

    #[instrument(skip(self, media, caption), fields(to = %to, file_name = %media.file_name))]
    async fn send_media(
        &self,
        to: &AccountId,
        media: &MediaAttachment,
        caption: &str,
    ) -> Result<String, ApplicationError> {
        self.client
            .send_document(
                to.as_str(),
                &media.file_name,
                &media.mime_type,
                &media.data,
                caption,
            )
            .await
            .map_err(|e| map_error("WhatsApp media send failed", e))
    }
}
