//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod pdf_staging_adapter;
mod whatsapp_gateway_adapter;

pub use pdf_staging_adapter::PdfStagingAdapter;
pub use whatsapp_gateway_adapter::WhatsAppGatewayAdapter;
