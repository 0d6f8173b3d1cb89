//! Domain layer for the WhatsApp relay
//!
//! Contains the phone number rules, session lifecycle types, request and
//! outcome entities, and domain errors. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
