//! Shared schema tenancy strategy.
//!
//! In this strategy, all tenants share the same database tables with a
//! `tenant_id` column used to filter data. [`TenantScope`] is the single
//! place that predicate is added.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TenantError;
use crate::query::{SelectQuery, SqlFragment};
use crate::tenant::{TenantContext, TenantId, TenantSource};

/// What to do when no tenant can be resolved for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TenantResolutionPolicy {
    /// Run the query without a tenant predicate and log a warning.
    ///
    /// Used for system and administrative contexts that legitimately span
    /// tenants.
    #[default]
    FailOpen,
    /// Refuse to run the query.
    FailClosed,
}

impl fmt::Display for TenantResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenantResolutionPolicy::FailOpen => write!(f, "fail-open"),
            TenantResolutionPolicy::FailClosed => write!(f, "fail-closed"),
        }
    }
}

impl FromStr for TenantResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "open" => Ok(TenantResolutionPolicy::FailOpen),
            "fail-closed" | "closed" => Ok(TenantResolutionPolicy::FailClosed),
            other => Err(format!(
                "unknown tenant policy '{}', expected fail-open or fail-closed",
                other
            )),
        }
    }
}

/// Configuration for shared schema tenancy.
///
/// # Example
///
/// ```
/// use tracekeep_persistence::strategy::{SharedSchemaConfig, TenantResolutionPolicy};
///
/// let config = SharedSchemaConfig {
///     policy: TenantResolutionPolicy::FailClosed,
///     ..Default::default()
/// };
/// assert_eq!(config.tenant_column, "tenant_id");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedSchemaConfig {
    /// The name of the tenant ID column in tenant-owned tables.
    #[serde(default = "default_tenant_column")]
    pub tenant_column: String,

    /// Behaviour when no tenant is resolvable.
    #[serde(default)]
    pub policy: TenantResolutionPolicy,

    /// Whether the `X-Tenant-ID` header is consulted when the request
    /// context carries no tenant.
    #[serde(default = "default_true")]
    pub header_fallback: bool,
}

fn default_tenant_column() -> String {
    "tenant_id".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SharedSchemaConfig {
    fn default() -> Self {
        Self {
            tenant_column: default_tenant_column(),
            policy: TenantResolutionPolicy::default(),
            header_fallback: true,
        }
    }
}

impl SharedSchemaConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resolution policy.
    pub fn with_policy(mut self, policy: TenantResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the tenant column name.
    pub fn with_tenant_column(mut self, column: impl Into<String>) -> Self {
        self.tenant_column = column.into();
        self
    }
}

/// The tenant narrowing to apply to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantFilter {
    /// Restrict rows to this tenant.
    Tenant(TenantId),
    /// No tenant predicate.
    Unfiltered,
}

impl TenantFilter {
    /// Returns the tenant ID, if the filter restricts to one.
    pub fn tenant_id(&self) -> Option<TenantId> {
        match self {
            TenantFilter::Tenant(id) => Some(*id),
            TenantFilter::Unfiltered => None,
        }
    }
}

/// Result of resolving a tenant for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantResolution {
    /// The filter to apply.
    pub filter: TenantFilter,
    /// Where the tenant came from.
    pub source: TenantSource,
}

impl TenantResolution {
    /// A resolution that applies no filter.
    pub fn unfiltered() -> Self {
        Self {
            filter: TenantFilter::Unfiltered,
            source: TenantSource::None,
        }
    }

    /// Returns the resolved tenant ID, if any.
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.filter.tenant_id()
    }
}

/// Tenant scope for tenant-owned tables.
///
/// Every storage method that touches a tenant-owned table passes its query
/// through [`TenantScope::scope_query`] (reads) or
/// [`TenantScope::stamp_tenant`] (inserts).
///
/// # Query Modification
///
/// ```sql
/// -- Original query
/// SELECT e.* FROM events e WHERE e.id = ?;
///
/// -- Modified query
/// SELECT e.* FROM events e WHERE e.id = ? AND e.tenant_id = ?;
/// ```
///
/// # Example
///
/// ```
/// use tracekeep_persistence::query::SelectQuery;
/// use tracekeep_persistence::strategy::{SharedSchemaConfig, TenantScope};
/// use tracekeep_persistence::tenant::{TenantContext, TenantId};
///
/// let scope = TenantScope::new(SharedSchemaConfig::default()).unwrap();
/// let ctx = TenantContext::for_tenant(TenantId::new(7));
///
/// let mut query = SelectQuery::new("events", "e");
/// scope.scope_query(&ctx, "events", &mut query).unwrap();
/// assert_eq!(query.build().sql, "SELECT e.* FROM events e WHERE e.tenant_id = ?");
/// ```
#[derive(Debug, Clone)]
pub struct TenantScope {
    config: SharedSchemaConfig,
}

impl TenantScope {
    /// Creates a tenant scope, validating the configured column name.
    pub fn new(config: SharedSchemaConfig) -> Result<Self, TenantError> {
        let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|_| {
            TenantError::InvalidTenantColumn {
                column: config.tenant_column.clone(),
            }
        })?;
        if !identifier.is_match(&config.tenant_column) {
            return Err(TenantError::InvalidTenantColumn {
                column: config.tenant_column.clone(),
            });
        }
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SharedSchemaConfig {
        &self.config
    }

    /// Returns the tenant column name.
    pub fn tenant_column(&self) -> &str {
        &self.config.tenant_column
    }

    /// Returns the resolution policy.
    pub fn policy(&self) -> TenantResolutionPolicy {
        self.config.policy
    }

    /// Resolves the tenant for a query on `entity`.
    ///
    /// The request context wins; the header is only consulted when the
    /// context is empty. When neither resolves, the result depends on the
    /// policy: an unfiltered resolution (fail-open) or
    /// [`TenantError::Unresolved`] (fail-closed).
    pub fn resolve(
        &self,
        ctx: &TenantContext,
        entity: &str,
    ) -> Result<TenantResolution, TenantError> {
        if let Some(tenant_id) = ctx.session_tenant() {
            return Ok(TenantResolution {
                filter: TenantFilter::Tenant(tenant_id),
                source: TenantSource::Context,
            });
        }

        if self.config.header_fallback {
            if let Some(tenant_id) = ctx.header_tenant().and_then(TenantId::from_header_value) {
                return Ok(TenantResolution {
                    filter: TenantFilter::Tenant(tenant_id),
                    source: TenantSource::Header,
                });
            }
            if let Some(raw) = ctx.header_tenant() {
                debug!(entity, header = %raw, "Ignoring non-numeric X-Tenant-ID header");
            }
        }

        match self.config.policy {
            TenantResolutionPolicy::FailOpen => Ok(TenantResolution::unfiltered()),
            TenantResolutionPolicy::FailClosed => Err(TenantError::Unresolved {
                entity: entity.to_string(),
            }),
        }
    }

    /// Adds the tenant predicate described by `resolution` to `query`.
    ///
    /// Logs the applied tenant at debug level, or a warning naming the entity
    /// when the query stays unfiltered.
    pub fn apply(&self, query: &mut SelectQuery, entity: &str, resolution: &TenantResolution) {
        match resolution.filter {
            TenantFilter::Tenant(tenant_id) => {
                let column = query.qualify(&self.config.tenant_column);
                query.filter(SqlFragment::eq(column, tenant_id.get()));
                debug!(
                    entity,
                    tenant_id = %tenant_id,
                    source = %resolution.source,
                    "Applied tenant scope"
                );
            }
            TenantFilter::Unfiltered => {
                warn!(entity, "No tenant resolvable; query runs without tenant scope");
            }
        }
    }

    /// Resolves the tenant for `ctx` and applies it to `query`.
    pub fn scope_query(
        &self,
        ctx: &TenantContext,
        entity: &str,
        query: &mut SelectQuery,
    ) -> Result<TenantResolution, TenantError> {
        let resolution = self.resolve(ctx, entity)?;
        self.apply(query, entity, &resolution);
        Ok(resolution)
    }

    /// Returns the `tenant_id` value to write on a new row of `entity`.
    ///
    /// `explicit` is a tenant named by the payload itself; a resolved tenant
    /// always takes precedence over it so that a request cannot write rows
    /// into another tenant.
    pub fn stamp_tenant(
        &self,
        ctx: &TenantContext,
        entity: &str,
        explicit: Option<TenantId>,
    ) -> Result<Option<TenantId>, TenantError> {
        let resolution = self.resolve(ctx, entity)?;
        match resolution.filter {
            TenantFilter::Tenant(tenant_id) => {
                if let Some(requested) = explicit.filter(|requested| *requested != tenant_id) {
                    warn!(
                        entity,
                        requested = %requested,
                        tenant_id = %tenant_id,
                        "Payload tenant differs from request tenant; using request tenant"
                    );
                }
                debug!(entity, tenant_id = %tenant_id, source = %resolution.source, "Stamped tenant on insert");
                Ok(Some(tenant_id))
            }
            TenantFilter::Unfiltered => {
                warn!(entity, "No tenant resolvable; row written without request tenant");
                Ok(explicit)
            }
        }
    }
}

impl Default for TenantScope {
    fn default() -> Self {
        Self {
            config: SharedSchemaConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SqlParam;

    fn scope() -> TenantScope {
        TenantScope::new(SharedSchemaConfig::default()).unwrap()
    }

    fn closed_scope() -> TenantScope {
        TenantScope::new(SharedSchemaConfig::new().with_policy(TenantResolutionPolicy::FailClosed))
            .unwrap()
    }

    #[test]
    fn test_context_takes_precedence_over_header() {
        let ctx = TenantContext::for_tenant(TenantId::new(7)).with_header_tenant("9");
        let resolution = scope().resolve(&ctx, "events").unwrap();
        assert_eq!(resolution.tenant_id(), Some(TenantId::new(7)));
        assert_eq!(resolution.source, TenantSource::Context);
    }

    #[test]
    fn test_header_fallback() {
        let ctx = TenantContext::new().with_header_tenant("9");
        let resolution = scope().resolve(&ctx, "events").unwrap();
        assert_eq!(resolution.tenant_id(), Some(TenantId::new(9)));
        assert_eq!(resolution.source, TenantSource::Header);
    }

    #[test]
    fn test_header_fallback_disabled() {
        let config = SharedSchemaConfig {
            header_fallback: false,
            ..Default::default()
        };
        let scope = TenantScope::new(config).unwrap();
        let ctx = TenantContext::new().with_header_tenant("9");
        let resolution = scope.resolve(&ctx, "events").unwrap();
        assert_eq!(resolution.filter, TenantFilter::Unfiltered);
    }

    #[test]
    fn test_nothing_resolvable_fails_open() {
        let resolution = scope().resolve(&TenantContext::new(), "events").unwrap();
        assert_eq!(resolution, TenantResolution::unfiltered());

        let mut query = SelectQuery::new("events", "e");
        scope().apply(&mut query, "events", &resolution);
        assert_eq!(query.condition_count(), 0);
        assert_eq!(query.build().sql, "SELECT e.* FROM events e");
    }

    #[test]
    fn test_malformed_header_is_ignored() {
        let ctx = TenantContext::new().with_header_tenant("acme");
        let resolution = scope().resolve(&ctx, "events").unwrap();
        assert_eq!(resolution.filter, TenantFilter::Unfiltered);
    }

    #[test]
    fn test_nothing_resolvable_fails_closed() {
        let err = closed_scope()
            .resolve(&TenantContext::new(), "batches")
            .unwrap_err();
        assert!(matches!(err, TenantError::Unresolved { ref entity } if entity == "batches"));
    }

    #[test]
    fn test_apply_adds_predicate() {
        let ctx = TenantContext::new().with_header_tenant("9");
        let mut query = SelectQuery::new("events", "e");
        let resolution = scope().scope_query(&ctx, "events", &mut query).unwrap();

        assert_eq!(resolution.source, TenantSource::Header);
        let built = query.build();
        assert_eq!(built.sql, "SELECT e.* FROM events e WHERE e.tenant_id = ?");
        assert_eq!(built.params, vec![SqlParam::Integer(9)]);
    }

    #[test]
    fn test_custom_tenant_column() {
        let scope =
            TenantScope::new(SharedSchemaConfig::new().with_tenant_column("org_id")).unwrap();
        let mut query = SelectQuery::new("batches", "b");
        scope
            .scope_query(&TenantContext::for_tenant(TenantId::new(1)), "batches", &mut query)
            .unwrap();
        assert_eq!(query.build().sql, "SELECT b.* FROM batches b WHERE b.org_id = ?");
    }

    #[test]
    fn test_invalid_tenant_column_rejected() {
        let result =
            TenantScope::new(SharedSchemaConfig::new().with_tenant_column("tenant_id; DROP"));
        assert!(matches!(result, Err(TenantError::InvalidTenantColumn { .. })));
    }

    #[test]
    fn test_stamp_prefers_request_tenant() {
        let ctx = TenantContext::for_tenant(TenantId::new(7));
        let stamped = scope()
            .stamp_tenant(&ctx, "events", Some(TenantId::new(9)))
            .unwrap();
        assert_eq!(stamped, Some(TenantId::new(7)));
    }

    #[test]
    fn test_stamp_unresolved_keeps_explicit() {
        let stamped = scope()
            .stamp_tenant(&TenantContext::new(), "events", Some(TenantId::new(9)))
            .unwrap();
        assert_eq!(stamped, Some(TenantId::new(9)));

        let err = closed_scope()
            .stamp_tenant(&TenantContext::new(), "events", None)
            .unwrap_err();
        assert!(matches!(err, TenantError::Unresolved { .. }));
    }

    #[test]
    fn test_policy_parse_and_display() {
        assert_eq!(
            "fail-closed".parse::<TenantResolutionPolicy>().unwrap(),
            TenantResolutionPolicy::FailClosed
        );
        assert_eq!(
            "OPEN".parse::<TenantResolutionPolicy>().unwrap(),
            TenantResolutionPolicy::FailOpen
        );
        assert!("maybe".parse::<TenantResolutionPolicy>().is_err());
        assert_eq!(TenantResolutionPolicy::FailClosed.to_string(), "fail-closed");
    }
}
