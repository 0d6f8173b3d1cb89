//! Background tasks for the HTTP presentation layer

mod session_events;
mod session_monitor;

pub use session_events::{render_qr, spawn_session_event_logger};
pub use session_monitor::spawn_session_monitor_task;
