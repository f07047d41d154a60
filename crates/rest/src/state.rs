//! Application state for the Tracekeep REST API.
//!
//! Everything handlers share: the storage backend, the server configuration,
//! the event validation policy and the facility-operator memo.

use std::sync::Arc;

use tracekeep_persistence::core::{EventStorage, ExistenceOracle};
use tracekeep_persistence::validation::EventValidationPolicy;

use crate::config::ServerConfig;
use crate::permissions::FacilityOperatorMemo;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `S` - The storage backend; it also answers existence checks during
///   validation.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tracekeep_persistence::backends::sqlite::SqliteBackend;
/// use tracekeep_rest::{AppState, ServerConfig};
///
/// let backend = SqliteBackend::in_memory()?;
/// let state = AppState::new(Arc::new(backend), ServerConfig::default());
/// ```
pub struct AppState<S> {
    storage: Arc<S>,
    config: Arc<ServerConfig>,
    policy: EventValidationPolicy,
    operator_memo: Arc<FacilityOperatorMemo>,
}

// S sits behind an Arc, so it does not need to be Clone itself.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
            policy: self.policy,
            operator_memo: Arc::clone(&self.operator_memo),
        }
    }
}

impl<S> AppState<S>
where
    S: EventStorage + ExistenceOracle,
{
    /// Creates state with the default validation policy and an empty memo.
    pub fn new(storage: Arc<S>, config: ServerConfig) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            policy: EventValidationPolicy::new(),
            operator_memo: Arc::new(FacilityOperatorMemo::new()),
        }
    }

    /// Replaces the validation policy.
    pub fn with_policy(mut self, policy: EventValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a clone of the storage Arc.
    pub fn storage_arc(&self) -> Arc<S> {
        Arc::clone(&self.storage)
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the event validation policy.
    pub fn policy(&self) -> &EventValidationPolicy {
        &self.policy
    }

    /// Returns the facility-operator memo.
    pub fn operator_memo(&self) -> &FacilityOperatorMemo {
        &self.operator_memo
    }
}
