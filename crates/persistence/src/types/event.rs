//! Traceability event types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::tenant::TenantId;

use super::payload::{EventPayload, parse_decimal, parse_integer};

/// The kind of traceability event being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Batch moved between locations.
    Movement,
    /// Cultivation activity on a batch.
    Cultivation,
    /// Batch harvested.
    Harvest,
    /// Sample taken from a batch.
    Sampling,
    /// Batch destroyed.
    Destruction,
    /// Batch lost or stolen.
    LossTheft,
    /// Batch processed into another product.
    Processing,
    /// Manual inventory correction.
    InventoryAdjustment,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [EventType; 8] = [
        EventType::Movement,
        EventType::Cultivation,
        EventType::Harvest,
        EventType::Sampling,
        EventType::Destruction,
        EventType::LossTheft,
        EventType::Processing,
        EventType::InventoryAdjustment,
    ];

    /// Returns the wire name of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Movement => "movement",
            EventType::Cultivation => "cultivation",
            EventType::Harvest => "harvest",
            EventType::Sampling => "sampling",
            EventType::Destruction => "destruction",
            EventType::LossTheft => "loss_theft",
            EventType::Processing => "processing",
            EventType::InventoryAdjustment => "inventory_adjustment",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    /// Parses a wire name. Matching is exact: `"Harvest"` is not accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {}", s))
    }
}

/// A validated traceability event ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Kind of event.
    pub event_type: EventType,
    /// Cultivation area the event happened in.
    pub area_id: i64,
    /// Facility the event happened in.
    pub facility_id: i64,
    /// User who recorded the event.
    pub user_id: i64,
    /// Batch the event applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,
    /// Batch produced by the event (processing, splits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_batch_id: Option<i64>,
    /// Origin location (movement).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_location: Option<String>,
    /// Destination location (movement).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_location: Option<String>,
    /// Origin sub-location, such as a room or shelf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_sub_location: Option<String>,
    /// Destination sub-location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_sub_location: Option<String>,
    /// Quantity affected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    /// Unit of `quantity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Free-text reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Method used, e.g. for destruction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Tenant named by the payload; the request tenant overrides it on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
}

impl NewEvent {
    /// Creates an event with only the always-required fields set.
    pub fn new(event_type: EventType, area_id: i64, facility_id: i64, user_id: i64) -> Self {
        Self {
            event_type,
            area_id,
            facility_id,
            user_id,
            batch_id: None,
            new_batch_id: None,
            from_location: None,
            to_location: None,
            from_sub_location: None,
            to_sub_location: None,
            quantity: None,
            unit: None,
            reason: None,
            description: None,
            method: None,
            tenant_id: None,
        }
    }

    /// Sets the batch reference.
    pub fn with_batch(mut self, batch_id: i64) -> Self {
        self.batch_id = Some(batch_id);
        self
    }

    /// Sets the movement endpoints.
    pub fn with_locations(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_location = Some(from.into());
        self.to_location = Some(to.into());
        self
    }
}

impl TryFrom<&EventPayload> for NewEvent {
    type Error = ValidationError;

    /// Converts a payload that passed validation.
    ///
    /// The checks here only guard the conversion itself; run the
    /// [`EventValidationPolicy`](crate::validation::EventValidationPolicy)
    /// first to get field-level messages.
    fn try_from(payload: &EventPayload) -> Result<Self, Self::Error> {
        let event_type = payload
            .string("event_type")
            .ok_or_else(|| invalid("event_type", "missing"))?
            .parse::<EventType>()
            .map_err(|e| invalid("event_type", &e))?;

        Ok(NewEvent {
            event_type,
            area_id: required_integer(payload, "area_id")?,
            facility_id: required_integer(payload, "facility_id")?,
            user_id: required_integer(payload, "user_id")?,
            batch_id: optional_integer(payload, "batch_id")?,
            new_batch_id: optional_integer(payload, "new_batch_id")?,
            from_location: payload.string("from_location").map(String::from),
            to_location: payload.string("to_location").map(String::from),
            from_sub_location: payload.string("from_sub_location").map(String::from),
            to_sub_location: payload.string("to_sub_location").map(String::from),
            quantity: match payload.non_empty("quantity") {
                Some(value) => {
                    Some(parse_decimal(value).ok_or_else(|| invalid("quantity", "not numeric"))?)
                }
                None => None,
            },
            unit: payload.string("unit").map(String::from),
            reason: payload.string("reason").map(String::from),
            description: payload.string("description").map(String::from),
            method: payload.string("method").map(String::from),
            tenant_id: optional_integer(payload, "tenant_id")?.map(TenantId::new),
        })
    }
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidField {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn required_integer(payload: &EventPayload, field: &str) -> Result<i64, ValidationError> {
    optional_integer(payload, field)?.ok_or_else(|| invalid(field, "missing"))
}

fn optional_integer(payload: &EventPayload, field: &str) -> Result<Option<i64>, ValidationError> {
    match payload.non_empty(field) {
        Some(value) => parse_integer(value)
            .map(Some)
            .ok_or_else(|| invalid(field, "not an integer")),
        None => Ok(None),
    }
}

/// A persisted traceability event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Row identifier.
    pub id: i64,
    /// Public identifier.
    pub uid: Uuid,
    /// Event fields; `event.tenant_id` is the owning tenant.
    #[serde(flatten)]
    pub event: NewEvent,
    /// When the event was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Returns the owning tenant, if the row was written with one.
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.event.tenant_id
    }
}

/// Default page size for event listings.
pub const DEFAULT_EVENT_LIMIT: usize = 100;

/// Maximum page size for event listings.
pub const MAX_EVENT_LIMIT: usize = 1000;

/// Filters for listing events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Only events of this type.
    #[serde(default)]
    pub event_type: Option<EventType>,
    /// Only events for this batch.
    #[serde(default)]
    pub batch_id: Option<i64>,
    /// Only events in this facility.
    #[serde(default)]
    pub facility_id: Option<i64>,
    /// Maximum number of rows.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Returns the effective limit, clamped to [`MAX_EVENT_LIMIT`].
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_EVENT_LIMIT)
            .clamp(1, MAX_EVENT_LIMIT)
    }
}
