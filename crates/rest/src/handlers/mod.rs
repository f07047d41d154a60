//! HTTP request handlers.
//!
//! - [`events`] - Record, validate, list and read traceability events
//! - [`session`] - Permission-derived UI flags
//! - [`health`] - Health check endpoint

pub mod events;
pub mod health;
pub mod session;

pub use events::{
    create_event_handler, list_events_handler, read_event_handler, validate_event_handler,
};
pub use health::health_handler;
pub use session::{UiFlags, ui_flags_handler};
