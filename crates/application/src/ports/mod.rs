//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod document_stage_port;
mod messaging_client_port;

#[cfg(test)]
pub use document_stage_port::MockDocumentStagePort;
pub use document_stage_port::{DocumentStagePort, StagedDocument};
#[cfg(test)]
pub use messaging_client_port::MockMessagingClientPort;
pub use messaging_client_port::MessagingClientPort;
