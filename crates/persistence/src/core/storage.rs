//! Event and reference storage traits.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::tenant::TenantContext;
use crate::types::{Collection, EventQuery, NewEvent, ReferenceRecord, StoredEvent};

/// Storage for traceability events.
///
/// Events live in a tenant-owned table. Reads only see rows of the tenant
/// resolved from `tenant`; inserts are stamped with that tenant.
///
/// # Errors
///
/// * `StorageError::Tenant(Unresolved)` - No tenant resolvable and the scope
///   fails closed
/// * `StorageError::Backend` - The database could not be reached or the
///   statement failed
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Checks that the backend can serve requests.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Persists a validated event and returns the stored row.
    async fn record_event(
        &self,
        tenant: &TenantContext,
        event: NewEvent,
    ) -> StorageResult<StoredEvent>;

    /// Reads one event by id.
    ///
    /// Returns `Ok(None)` when the row does not exist or belongs to another
    /// tenant.
    async fn read_event(&self, tenant: &TenantContext, id: i64)
    -> StorageResult<Option<StoredEvent>>;

    /// Lists events matching `query`, newest first.
    async fn list_events(
        &self,
        tenant: &TenantContext,
        query: &EventQuery,
    ) -> StorageResult<Vec<StoredEvent>>;

    /// Counts events visible to the tenant.
    async fn count_events(&self, tenant: &TenantContext) -> StorageResult<u64>;
}

/// Storage for the reference collections events point at.
#[async_trait]
pub trait ReferenceStorage: Send + Sync {
    /// Creates a row and returns it.
    ///
    /// Rows of tenant-owned collections are stamped with the resolved
    /// tenant.
    async fn create_reference(
        &self,
        tenant: &TenantContext,
        collection: Collection,
        name: &str,
    ) -> StorageResult<ReferenceRecord>;

    /// Lists rows of a collection visible to the tenant.
    async fn list_references(
        &self,
        tenant: &TenantContext,
        collection: Collection,
    ) -> StorageResult<Vec<ReferenceRecord>>;
}
