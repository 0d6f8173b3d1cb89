//! WhatsApp integration
//!
//! REST client for the WhatsApp Web gateway that owns the linked session.

pub mod client;

pub use client::{NumberCheck, WhatsAppClient, WhatsAppClientConfig, WhatsAppError};
