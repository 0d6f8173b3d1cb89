//! Value Objects - Immutable, identity-less domain primitives

mod account_id;
mod phone_number;
mod session;

pub use account_id::AccountId;
pub use phone_number::{
    CANONICAL_LENGTH, COUNTRY_CODE, NormalizationMode, PhoneNumber, normalize_digits,
};
pub use session::{ConnectionStatus, SessionEvent, SessionState};
