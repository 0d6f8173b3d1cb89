//! Outbound message content and delivery outcome

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIME type of PDF attachments
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file to deliver as a message attachment
#[derive(Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    /// File name shown to the recipient
    pub file_name: String,
    /// MIME type of the content
    pub mime_type: String,
    /// Raw file bytes
    pub data: Vec<u8>,
}

impl MediaAttachment {
    /// Create a PDF attachment
    #[must_use]
    pub fn pdf(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: PDF_MIME_TYPE.to_string(),
            data,
        }
    }

    /// Size of the content in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the content is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// Keeps file contents out of logs
impl fmt::Debug for MediaAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAttachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// What was delivered for a successful send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    /// Plain text message
    Text,
    /// PDF document with the message as caption
    PdfWithCaption,
}

impl SendOutcome {
    /// Wire name of the outcome
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::PdfWithCaption => "pdf_with_caption",
        }
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
