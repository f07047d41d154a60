//! Event payload validation.
//!
//! [`EventValidationPolicy`] checks a proposed event against the static
//! [`EVENT_FIELDS`] table. Each field is evaluated once:
//!
//! 1. If the value is empty (absent, `null`, blank string) the field's
//!    [`Requirement`] decides between a "required" message and skipping it.
//! 2. Otherwise its [`Constraint`]s run in order and the first failure is
//!    recorded. Existence checks only see values that passed their type
//!    check.
//!
//! Existence checks go through an [`ExistenceOracle`] within the request's
//! [`TenantContext`], so references to another tenant's rows are rejected.
//! If the oracle itself fails, validation returns that error instead of an
//! outcome.
//!
//! # Example
//!
//! ```ignore
//! use tracekeep_persistence::validation::{EventValidationPolicy, ValidationOutcome};
//!
//! let outcome = EventValidationPolicy::new().validate(&payload, &ctx, &backend).await?;
//! if let ValidationOutcome::Rejected(errors) = outcome {
//!     for (field, messages) in errors.iter() {
//!         println!("{field}: {messages:?}");
//!     }
//! }
//! ```

mod errors;
mod rules;

pub use errors::ValidationErrors;
pub use rules::{BATCH_REQUIRED_MESSAGE, Constraint, EVENT_FIELDS, FieldSpec, Requirement};

use serde_json::Value;
use tracing::debug;

use crate::core::ExistenceOracle;
use crate::error::{StorageResult, ValidationError};
use crate::tenant::TenantContext;
use crate::types::{EventPayload, EventType, is_numeric, parse_decimal, parse_integer};

/// Result of validating a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Every rule passed.
    Accepted,
    /// At least one rule failed.
    Rejected(ValidationErrors),
}

impl ValidationOutcome {
    /// Returns `true` if the payload was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }

    /// Returns the violations, if any.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            ValidationOutcome::Accepted => None,
            ValidationOutcome::Rejected(errors) => Some(errors),
        }
    }

    /// Converts a rejection into [`ValidationError::Rejected`].
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationOutcome::Accepted => Ok(()),
            ValidationOutcome::Rejected(errors) => Err(ValidationError::Rejected { errors }),
        }
    }
}

/// Validates traceability event payloads.
#[derive(Debug, Clone, Copy)]
pub struct EventValidationPolicy {
    fields: &'static [FieldSpec],
}

impl EventValidationPolicy {
    /// Creates a policy over [`EVENT_FIELDS`].
    pub fn new() -> Self {
        Self {
            fields: EVENT_FIELDS,
        }
    }

    /// Creates a policy over a custom rule table.
    pub fn with_fields(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Returns the rule table.
    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Validates `payload` for the tenant resolved from `tenant`.
    ///
    /// # Errors
    ///
    /// Returns the oracle's error when an existence check cannot be
    /// answered, including a tenant that cannot be resolved under a
    /// fail-closed policy. A referenced row that does not exist is a
    /// rejection, not an error.
    pub async fn validate(
        &self,
        payload: &EventPayload,
        tenant: &TenantContext,
        oracle: &dyn ExistenceOracle,
    ) -> StorageResult<ValidationOutcome> {
        let event_type = payload.string("event_type");
        let mut errors = ValidationErrors::new();

        for rule in self.fields {
            let Some(value) = payload.non_empty(rule.field) else {
                if rule.requirement.is_required(event_type) {
                    errors.add(rule.field, rule.required_error());
                }
                continue;
            };

            for constraint in rule.constraints {
                if !check(constraint, value, tenant, oracle).await? {
                    errors.add(rule.field, rule.constraint_error(constraint));
                    break;
                }
            }
        }

        if errors.is_empty() {
            debug!(event_type = ?event_type, "Event payload accepted");
            Ok(ValidationOutcome::Accepted)
        } else {
            debug!(
                event_type = ?event_type,
                fields = ?errors.fields().collect::<Vec<_>>(),
                "Event payload rejected"
            );
            Ok(ValidationOutcome::Rejected(errors))
        }
    }
}

impl Default for EventValidationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

async fn check(
    constraint: &Constraint,
    value: &Value,
    tenant: &TenantContext,
    oracle: &dyn ExistenceOracle,
) -> StorageResult<bool> {
    let passed = match constraint {
        Constraint::String => value.is_string(),
        Constraint::MaxLength(max) => value
            .as_str()
            .is_some_and(|s| s.chars().count() <= *max),
        Constraint::Integer => parse_integer(value).is_some(),
        Constraint::Numeric => is_numeric(value),
        Constraint::DecimalRange => parse_decimal(value).is_some(),
        Constraint::EventType => value
            .as_str()
            .is_some_and(|s| s.parse::<EventType>().is_ok()),
        Constraint::Exists(collection) => match parse_integer(value) {
            Some(id) => oracle.exists(tenant, *collection, id).await?,
            None => false,
        },
    };
    Ok(passed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::error::{BackendError, StorageError};
    use crate::types::Collection;

    /// Oracle backed by a fixed set of rows.
    struct FixedOracle(HashSet<(Collection, i64)>);

    impl FixedOracle {
        fn with_rows(rows: &[(Collection, i64)]) -> Self {
            Self(rows.iter().copied().collect())
        }

        fn seeded() -> Self {
            Self::with_rows(&[
                (Collection::CultivationAreas, 1),
                (Collection::Facilities, 1),
                (Collection::Users, 1),
                (Collection::Batches, 1),
                (Collection::Batches, 2),
                (Collection::Tenants, 7),
            ])
        }
    }

    #[async_trait]
    impl ExistenceOracle for FixedOracle {
        async fn exists(
            &self,
            _tenant: &TenantContext,
            collection: Collection,
            id: i64,
        ) -> StorageResult<bool> {
            Ok(self.0.contains(&(collection, id)))
        }
    }

    struct DownOracle;

    #[async_trait]
    impl ExistenceOracle for DownOracle {
        async fn exists(
            &self,
            _tenant: &TenantContext,
            _collection: Collection,
            _id: i64,
        ) -> StorageResult<bool> {
            Err(BackendError::Unavailable {
                backend_name: "test".to_string(),
                message: "down".to_string(),
            }
            .into())
        }
    }

    fn payload(value: Value) -> EventPayload {
        EventPayload::try_from(value).unwrap()
    }

    async fn validate(value: Value) -> ValidationOutcome {
        EventValidationPolicy::new()
            .validate(&payload(value), &TenantContext::new(), &FixedOracle::seeded())
            .await
            .unwrap()
    }

    fn rejected(outcome: ValidationOutcome) -> ValidationErrors {
        match outcome {
            ValidationOutcome::Rejected(errors) => errors,
            ValidationOutcome::Accepted => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_movement_without_batch_is_accepted() {
        let outcome = validate(json!({
            "event_type": "movement",
            "area_id": 1,
            "facility_id": 1,
            "user_id": 1,
            "from_location": "A",
            "to_location": "B"
        }))
        .await;
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn test_harvest_without_batch_uses_custom_message() {
        let errors = rejected(
            validate(json!({
                "event_type": "harvest",
                "area_id": 1,
                "facility_id": 1,
                "user_id": 1
            }))
            .await,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("batch_id").unwrap(), [BATCH_REQUIRED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_movement_requires_locations() {
        let errors = rejected(
            validate(json!({
                "event_type": "movement",
                "area_id": 1,
                "facility_id": 1,
                "user_id": 1,
                "from_location": "  "
            }))
            .await,
        );
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["from_location", "to_location"]
        );
        assert_eq!(
            errors.first("to_location"),
            Some("The to location field is required.")
        );
    }

    #[tokio::test]
    async fn test_unknown_event_type_rejected() {
        let errors = rejected(
            validate(json!({
                "event_type": "transfer",
                "area_id": 1,
                "facility_id": 1,
                "user_id": 1,
                "batch_id": 1
            }))
            .await,
        );
        assert_eq!(
            errors.first("event_type"),
            Some("The selected event type is invalid.")
        );
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_payload_reports_every_required_field() {
        let errors = rejected(validate(json!({})).await);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["area_id", "batch_id", "event_type", "facility_id", "user_id"]
        );
    }

    #[tokio::test]
    async fn test_type_failure_skips_existence_check() {
        let policy = EventValidationPolicy::new();
        // DownOracle would error if consulted.
        let outcome = policy
            .validate(
                &payload(json!({
                    "event_type": "harvest",
                    "area_id": "abc",
                    "facility_id": 1.5,
                    "user_id": true,
                    "batch_id": "x"
                })),
                &TenantContext::new(),
                &DownOracle,
            )
            .await
            .unwrap();
        let errors = rejected(outcome);
        assert_eq!(errors.first("area_id"), Some("The area id must be an integer."));
        assert_eq!(
            errors.first("facility_id"),
            Some("The facility id must be an integer.")
        );
        assert_eq!(errors.get("user_id").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_references_are_rejections() {
        let errors = rejected(
            validate(json!({
                "event_type": "harvest",
                "area_id": 99,
                "facility_id": 1,
                "user_id": 1,
                "batch_id": 1,
                "new_batch_id": 42,
                "tenant_id": 8
            }))
            .await,
        );
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["area_id", "new_batch_id", "tenant_id"]
        );
        assert_eq!(errors.first("area_id"), Some("The selected area id is invalid."));
    }

    #[tokio::test]
    async fn test_oracle_failure_propagates() {
        let result = EventValidationPolicy::new()
            .validate(
                &payload(json!({
                    "event_type": "harvest",
                    "area_id": 1,
                    "facility_id": 1,
                    "user_id": 1,
                    "batch_id": 1
                })),
                &TenantContext::new(),
                &DownOracle,
            )
            .await;
        assert!(matches!(
            result,
            Err(StorageError::Backend(BackendError::Unavailable { .. }))
        ));
    }

    #[tokio::test]
    async fn test_optional_fields_checked_only_when_present() {
        let base = json!({
            "event_type": "destruction",
            "area_id": "1",
            "facility_id": "1",
            "user_id": "1",
            "batch_id": "2",
            "quantity": "",
            "reason": null
        });
        assert!(validate(base.clone()).await.is_accepted());

        let mut with_bad = base;
        with_bad["quantity"] = json!("lots");
        with_bad["unit"] = json!("g".repeat(51));
        with_bad["reason"] = json!(12);
        let errors = rejected(validate(with_bad).await);
        assert_eq!(errors.first("quantity"), Some("The quantity must be a number."));
        assert_eq!(
            errors.first("unit"),
            Some("The unit may not be greater than 50 characters.")
        );
        assert_eq!(errors.first("reason"), Some("The reason must be a string."));
    }

    #[tokio::test]
    async fn test_quantity_beyond_decimal_range_is_out_of_range() {
        let base = json!({
            "event_type": "harvest",
            "area_id": 1,
            "facility_id": 1,
            "user_id": 1,
            "batch_id": 1
        });

        for quantity in [json!(1e30), json!("-2.5e40")] {
            let mut body = base.clone();
            body["quantity"] = quantity;
            let errors = rejected(validate(body).await);
            assert_eq!(errors.first("quantity"), Some("The quantity is out of range."));
        }

        let mut body = base;
        body["quantity"] = json!("1e3");
        assert!(validate(body).await.is_accepted());
    }

    #[tokio::test]
    async fn test_length_counts_characters() {
        let outcome = validate(json!({
            "event_type": "movement",
            "area_id": 1,
            "facility_id": 1,
            "user_id": 1,
            "from_location": "é".repeat(255),
            "to_location": "B"
        }))
        .await;
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn test_same_payload_same_outcome() {
        let value = json!({"event_type": "sampling", "area_id": 1});
        let first = validate(value.clone()).await;
        let second = validate(value).await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationOutcome::Accepted.into_result().is_ok());
        let mut errors = ValidationErrors::new();
        errors.add("unit", "too long");
        let err = ValidationOutcome::Rejected(errors).into_result().unwrap_err();
        assert!(matches!(err, ValidationError::Rejected { .. }));
    }
}
