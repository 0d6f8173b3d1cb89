//! Phone number value object with Turkish MSISDN normalization
//!
//! Incoming numbers arrive in many shapes (`0539 732 46 62`, `5397324662`,
//! `+90 539 732 4662`, ...). Everything is reduced to the canonical
//! international form: twelve digits, prefixed with the `90` country code,
//! without a leading `+`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Country code every canonical number starts with
pub const COUNTRY_CODE: &str = "90";

/// Number of digits in a canonical number (country code included)
pub const CANONICAL_LENGTH: usize = 12;

/// How to treat digit strings that match none of the known shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    /// Unrecognized digit strings are passed through unchanged.
    ///
    /// The messaging client is left to reject numbers that do not belong
    /// to a real account.
    #[default]
    Lenient,
    /// Only results in canonical form are accepted.
    Strict,
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for NormalizationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(DomainError::ValidationError(format!(
                "unknown normalization mode '{other}', expected 'lenient' or 'strict'"
            ))),
        }
    }
}

/// Reduce a raw phone string to its normalized digit form.
///
/// Returns `None` when the input contains no digits at all. Inputs that
/// match none of the known shapes come back as their bare digits.
///
/// The function is pure and idempotent: normalizing an already normalized
/// number returns it unchanged.
pub fn normalize_digits(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return None;
    }

    let len = digits.len();

    // 905397324662
    if digits.starts_with(COUNTRY_CODE) && len == CANONICAL_LENGTH {
        return Some(digits);
    }

    // 05397324662
    if digits.starts_with('0') && len == CANONICAL_LENGTH - 1 && digits.as_bytes()[1] == b'5' {
        return Some(format!("{COUNTRY_CODE}{}", &digits[1..]));
    }

    // 5397324662
    if digits.starts_with('5') && len == CANONICAL_LENGTH - COUNTRY_CODE.len() {
        return Some(format!("{COUNTRY_CODE}{digits}"));
    }

    // Extra leading digits, e.g. a duplicated country code
    if digits.starts_with(COUNTRY_CODE) && len > CANONICAL_LENGTH {
        return Some(digits[len - CANONICAL_LENGTH..].to_string());
    }

    Some(digits)
}

/// Check whether a digit string is in canonical form
fn is_canonical_digits(value: &str) -> bool {
    value.len() == CANONICAL_LENGTH
        && value.starts_with(COUNTRY_CODE)
        && value.chars().all(|c| c.is_ascii_digit())
}

/// A normalized phone number (e.g. `905397324662`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber {
    value: String,
}

impl PhoneNumber {
    /// Normalize a raw phone string under the given mode
    ///
    /// Fails when the input has no digits, or, in strict mode, when the
    /// result is not canonical.
    pub fn normalize(raw: &str, mode: NormalizationMode) -> Result<Self, DomainError> {
        let Some(value) = normalize_digits(raw) else {
            return Err(DomainError::InvalidPhoneNumber(
                "phone number contains no digits".to_string(),
            ));
        };

        if mode == NormalizationMode::Strict && !is_canonical_digits(&value) {
            return Err(DomainError::InvalidPhoneNumber(format!(
                "{value} is not a {CANONICAL_LENGTH}-digit number starting with {COUNTRY_CODE}"
            )));
        }

        Ok(Self { value })
    }

    /// Get the normalized digits
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the number satisfies the canonical form
    pub fn is_canonical(&self) -> bool {
        is_canonical_digits(&self.value)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl TryFrom<&str> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::normalize(value, NormalizationMode::Lenient)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalize(&value, NormalizationMode::Lenient)
    }
}
