//! Inbound send request

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A request to relay a message to a phone number
///
/// Fields are optional at the wire level so that missing values can be
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Raw phone number as supplied by the caller
    #[serde(default, deserialize_with = "text_or_number")]
    pub phone: Option<String>,

    /// Message text, or the caption when a PDF is attached
    #[serde(default, deserialize_with = "text_or_number")]
    pub message: Option<String>,

    /// URL of a PDF to attach
    #[serde(
        default,
        rename = "pdfUrl",
        alias = "pdf_url",
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub pdf_url: Option<String>,
}

impl SendRequest {
    /// Create a text-only request
    #[must_use]
    pub fn new(phone: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            message: Some(message.into()),
            pdf_url: None,
        }
    }

    /// Attach a PDF by URL
    #[must_use]
    pub fn with_pdf_url(mut self, url: impl Into<String>) -> Self {
        self.pdf_url = Some(url.into());
        self
    }

    /// Phone number, `None` when absent or empty
    pub fn phone(&self) -> Option<&str> {
        non_empty(self.phone.as_deref())
    }

    /// Message text, `None` when absent or empty
    pub fn message(&self) -> Option<&str> {
        non_empty(self.message.as_deref())
    }

    /// PDF URL, `None` when absent or empty
    pub fn pdf_url(&self) -> Option<&str> {
        non_empty(self.pdf_url.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Accept strings and numbers; anything else counts as missing
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
