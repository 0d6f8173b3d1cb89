//! Messaging account identifier

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Serialized account id returned by the messaging client
/// (e.g. `905397324662@s.whatsapp.net`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap a serialized account id
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(DomainError::InvalidAccountId(
                "account id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the serialized form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_value() {
        let id = AccountId::new(" 905397324662@s.whatsapp.net ").unwrap();
        assert_eq!(id.as_str(), "905397324662@s.whatsapp.net");
        assert_eq!(id.to_string(), "905397324662@s.whatsapp.net");
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(
            AccountId::new("  "),
            Err(DomainError::InvalidAccountId(_))
        ));
    }
}
