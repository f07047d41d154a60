//! Core types for traceability events.
//!
//! - [`EventType`] - The closed set of event kinds
//! - [`EventPayload`] - A proposed event, before validation
//! - [`NewEvent`] - A validated event ready to persist
//! - [`StoredEvent`] - A persisted event with its metadata
//! - [`EventQuery`] - Filters for listing events
//! - [`Collection`] - Reference collections checked for existence

mod event;
mod payload;
mod reference;

pub use event::{
    DEFAULT_EVENT_LIMIT, EventQuery, EventType, MAX_EVENT_LIMIT, NewEvent, StoredEvent,
};
pub use payload::EventPayload;
pub(crate) use payload::{is_numeric, parse_decimal, parse_integer};
pub use reference::{Collection, ReferenceRecord};
