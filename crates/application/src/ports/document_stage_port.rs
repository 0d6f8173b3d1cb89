//! Document staging port
//!
//! Remote documents are downloaded into a temporary file before they are
//! attached to a message. Every staged file is discarded by its caller.

use std::path::PathBuf;

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use domain::MediaAttachment;

use crate::error::ApplicationError;

/// A downloaded document waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDocument {
    /// Location of the temporary file
    pub path: PathBuf,
    /// File name to present to the recipient
    pub file_name: String,
}

/// Port for fetching remote documents into temporary storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentStagePort: Send + Sync {
    /// Download `url` into a uniquely named temporary file
    async fn stage(&self, url: &str) -> Result<StagedDocument, ApplicationError>;

    /// Read a staged file as an attachment
    async fn load(&self, document: &StagedDocument) -> Result<MediaAttachment, ApplicationError>;

    /// Delete a staged file
    async fn discard(&self, document: &StagedDocument) -> Result<(), ApplicationError>;
}
