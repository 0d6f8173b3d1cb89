//! Relay service
//!
//! Turns a validated send request into a WhatsApp message. Checks run in a
//! fixed order: session readiness, required fields, phone normalization,
//! account lookup. Only then is anything fetched or sent.

use std::{fmt, sync::Arc};

use domain::{AccountId, NormalizationMode, PhoneNumber, SendOutcome, SendRequest};
use tracing::{info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{DocumentStagePort, MessagingClientPort, StagedDocument},
    services::SessionManager,
};

/// Orchestrates a single send
pub struct RelayService {
    session: SessionManager,
    client: Arc<dyn MessagingClientPort>,
    documents: Arc<dyn DocumentStagePort>,
    phone_mode: NormalizationMode,
}

impl fmt::Debug for RelayService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayService")
            .field("phone_mode", &self.phone_mode)
            .finish_non_exhaustive()
    }
}

impl RelayService {
    /// Create a new relay service
    pub fn new(
        session: SessionManager,
        client: Arc<dyn MessagingClientPort>,
        documents: Arc<dyn DocumentStagePort>,
    ) -> Self {
        Self {
            session,
            client,
            documents,
            phone_mode: NormalizationMode::default(),
        }
    }

    /// Set how phone numbers are normalized
    #[must_use]
    pub const fn with_phone_mode(mut self, mode: NormalizationMode) -> Self {
        self.phone_mode = mode;
        self
    }

    /// Session the service sends through
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Deliver a request as text, or as a PDF with the message as caption
    #[instrument(skip(self, request))]
    pub async fn send(&self, request: &SendRequest) -> Result<SendOutcome, ApplicationError> {
        if !self.session.is_ready() {
            return Err(ApplicationError::NotReady);
        }

        let (Some(raw_phone), Some(message)) = (request.phone(), request.message()) else {
            return Err(ApplicationError::MissingPhoneOrMessage);
        };
        info!(phone = raw_phone, "Incoming send request");

        let phone = PhoneNumber::normalize(raw_phone, self.phone_mode)
            .map_err(|_| ApplicationError::InvalidPhone(raw_phone.to_string()))?;
        info!(phone = %phone, "Normalized phone number");

        let account = self
            .client
            .resolve_account(&phone)
            .await?
            .ok_or_else(|| ApplicationError::not_a_user(phone.as_str()))?;

        match request.pdf_url() {
            None => {
                let id = self.client.send_text(&account, message).await?;
                info!(phone = %phone, message_id = %id, "Text message sent");
                Ok(SendOutcome::Text)
            },
            Some(url) => {
                self.send_pdf(&account, url, message).await?;
                info!(phone = %phone, "PDF sent with caption");
                Ok(SendOutcome::PdfWithCaption)
            },
        }
    }

    async fn send_pdf(
        &self,
        account: &AccountId,
        url: &str,
        caption: &str,
    ) -> Result<(), ApplicationError> {
        info!(pdf_url = url, "Fetching PDF");
        let staged = self.documents.stage(url).await?;

        let result = self.dispatch_staged(account, &staged, caption).await;

        // The temp file never outlives the request
        if let Err(e) = self.documents.discard(&staged).await {
            warn!(path = %staged.path.display(), error = %e, "Failed to remove temp file");
        }

        result
    }

    async fn dispatch_staged(
        &self,
        account: &AccountId,
        staged: &StagedDocument,
        caption: &str,
    ) -> Result<(), ApplicationError> {
        let media = self.documents.load(staged).await?;
        let id = self.client.send_media(account, &media, caption).await?;
        info!(file_name = %media.file_name, message_id = %id, "Media message sent");
        Ok(())
    }
}
