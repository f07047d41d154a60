//! The event field rule table.

use crate::types::{Collection, EventType};

/// When a field must carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Required for every event.
    Always,
    /// Required when `event_type` is one of the listed types.
    WhenEventType(&'static [EventType]),
    /// Required unless `event_type` is one of the listed types.
    UnlessEventType(&'static [EventType]),
    /// Never required.
    Optional,
}

impl Requirement {
    /// Returns `true` if the field is required for the given raw `event_type`.
    ///
    /// The raw value is compared by wire name, so an unknown or missing event
    /// type never satisfies `WhenEventType` and always triggers
    /// `UnlessEventType`.
    pub fn is_required(&self, event_type: Option<&str>) -> bool {
        let matches = |types: &[EventType]| {
            event_type.is_some_and(|raw| types.iter().any(|t| t.as_str() == raw))
        };
        match self {
            Requirement::Always => true,
            Requirement::WhenEventType(types) => matches(types),
            Requirement::UnlessEventType(types) => !matches(types),
            Requirement::Optional => false,
        }
    }
}

/// A check applied to a non-empty field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The value is a JSON string.
    String,
    /// The string has at most this many characters.
    MaxLength(usize),
    /// The value is an integer or a string of base-10 digits.
    Integer,
    /// The value is a number or a numeric string.
    Numeric,
    /// The numeric value fits a stored decimal quantity.
    DecimalRange,
    /// The value names one of the known event types.
    EventType,
    /// The integer value identifies a row of the collection.
    Exists(Collection),
}

/// Rules for a single payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Payload key.
    pub field: &'static str,
    /// When the field must be present.
    pub requirement: Requirement,
    /// Checks run in order on a present value; the first failure ends them.
    pub constraints: &'static [Constraint],
    /// Replaces the generic "required" message.
    pub required_message: Option<&'static str>,
}

impl FieldSpec {
    const fn new(
        field: &'static str,
        requirement: Requirement,
        constraints: &'static [Constraint],
    ) -> Self {
        Self {
            field,
            requirement,
            constraints,
            required_message: None,
        }
    }

    const fn with_required_message(mut self, message: &'static str) -> Self {
        self.required_message = Some(message);
        self
    }

    /// Returns the human-readable name used in messages (`area_id` -> `area id`).
    pub fn label(&self) -> String {
        self.field.replace('_', " ")
    }

    /// Message for a missing required value.
    pub fn required_error(&self) -> String {
        match self.required_message {
            Some(message) => message.to_string(),
            None => format!("The {} field is required.", self.label()),
        }
    }

    /// Message for a failed constraint.
    pub fn constraint_error(&self, constraint: &Constraint) -> String {
        let label = self.label();
        match constraint {
            Constraint::String => format!("The {} must be a string.", label),
            Constraint::MaxLength(max) => {
                format!("The {} may not be greater than {} characters.", label, max)
            }
            Constraint::Integer => format!("The {} must be an integer.", label),
            Constraint::Numeric => format!("The {} must be a number.", label),
            Constraint::DecimalRange => format!("The {} is out of range.", label),
            Constraint::EventType | Constraint::Exists(_) => {
                format!("The selected {} is invalid.", label)
            }
        }
    }
}

/// Message used when an event type that needs a batch arrives without one.
pub const BATCH_REQUIRED_MESSAGE: &str = "The batch identifier is required for this event type.";

const MOVEMENT: &[EventType] = &[EventType::Movement];

use Constraint::{DecimalRange, Exists, Integer, MaxLength, Numeric, String as Str};

/// Field rules for recording a traceability event, in evaluation order.
pub const EVENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("event_type", Requirement::Always, &[Str, Constraint::EventType]),
    FieldSpec::new(
        "area_id",
        Requirement::Always,
        &[Integer, Exists(Collection::CultivationAreas)],
    ),
    FieldSpec::new(
        "facility_id",
        Requirement::Always,
        &[Integer, Exists(Collection::Facilities)],
    ),
    FieldSpec::new("user_id", Requirement::Always, &[Integer, Exists(Collection::Users)]),
    FieldSpec::new(
        "batch_id",
        Requirement::UnlessEventType(MOVEMENT),
        &[Integer, Exists(Collection::Batches)],
    )
    .with_required_message(BATCH_REQUIRED_MESSAGE),
    FieldSpec::new(
        "from_location",
        Requirement::WhenEventType(MOVEMENT),
        &[Str, MaxLength(255)],
    ),
    FieldSpec::new(
        "to_location",
        Requirement::WhenEventType(MOVEMENT),
        &[Str, MaxLength(255)],
    ),
    FieldSpec::new("from_sub_location", Requirement::Optional, &[Str, MaxLength(255)]),
    FieldSpec::new("to_sub_location", Requirement::Optional, &[Str, MaxLength(255)]),
    FieldSpec::new("description", Requirement::Optional, &[Str, MaxLength(1000)]),
    FieldSpec::new("method", Requirement::Optional, &[Str, MaxLength(255)]),
    FieldSpec::new("reason", Requirement::Optional, &[Str]),
    FieldSpec::new(
        "new_batch_id",
        Requirement::Optional,
        &[Integer, Exists(Collection::Batches)],
    ),
    FieldSpec::new("quantity", Requirement::Optional, &[Numeric, DecimalRange]),
    FieldSpec::new("unit", Requirement::Optional, &[Str, MaxLength(50)]),
    FieldSpec::new(
        "tenant_id",
        Requirement::Optional,
        &[Integer, Exists(Collection::Tenants)],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements() {
        assert!(Requirement::Always.is_required(None));
        assert!(!Requirement::Optional.is_required(Some("movement")));

        let when = Requirement::WhenEventType(MOVEMENT);
        assert!(when.is_required(Some("movement")));
        assert!(!when.is_required(Some("harvest")));
        assert!(!when.is_required(None));

        let unless = Requirement::UnlessEventType(MOVEMENT);
        assert!(!unless.is_required(Some("movement")));
        assert!(unless.is_required(Some("harvest")));
        assert!(unless.is_required(Some("bogus")));
        assert!(unless.is_required(None));
    }

    #[test]
    fn test_fields_are_unique() {
        let mut fields: Vec<_> = EVENT_FIELDS.iter().map(|rule| rule.field).collect();
        fields.sort_unstable();
        fields.dedup();
        assert_eq!(fields.len(), EVENT_FIELDS.len());
    }

    #[test]
    fn test_messages() {
        let area = EVENT_FIELDS.iter().find(|s| s.field == "area_id").unwrap();
        assert_eq!(area.required_error(), "The area id field is required.");
        assert_eq!(
            area.constraint_error(&Constraint::Integer),
            "The area id must be an integer."
        );
        assert_eq!(
            area.constraint_error(&Constraint::Exists(Collection::CultivationAreas)),
            "The selected area id is invalid."
        );

        let batch = EVENT_FIELDS.iter().find(|s| s.field == "batch_id").unwrap();
        assert_eq!(batch.required_error(), BATCH_REQUIRED_MESSAGE);

        let unit = EVENT_FIELDS.iter().find(|s| s.field == "unit").unwrap();
        assert_eq!(
            unit.constraint_error(&Constraint::MaxLength(50)),
            "The unit may not be greater than 50 characters."
        );
    }
}
