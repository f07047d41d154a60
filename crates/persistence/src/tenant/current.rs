//! Request-scoped tenant slot.
//!
//! The tenant middleware runs each request inside [`scope`], which installs a
//! fresh task-local slot for the lifetime of the request future. Code running
//! inside the request can read and overwrite the slot; once the future
//! completes (or is dropped) the slot goes away with it, so a tenant id can
//! never leak into the next request handled by the same worker thread.
//!
//! Storage code does not read this slot directly. Handlers snapshot it into an
//! explicit [`TenantContext`](super::TenantContext) and pass that down.
//!
//! # Example
//!
//! ```
//! use tracekeep_persistence::tenant::{current, TenantId};
//!
//! # tokio_test::block_on(async {
//! let seen = current::scope(Some(TenantId::new(7)), async {
//!     current::tenant_id()
//! })
//! .await;
//! assert_eq!(seen, Some(TenantId::new(7)));
//!
//! // Outside any scope nothing is set.
//! assert_eq!(current::tenant_id(), None);
//! # });
//! ```

use std::cell::Cell;
use std::future::Future;
use std::panic::Location;

use tracing::{debug, warn};

use super::id::TenantId;

/// Label used when no caller location can be determined.
pub const UNKNOWN_CALLER: &str = "unknown";

tokio::task_local! {
    static CURRENT_TENANT: Cell<Option<TenantId>>;
}

/// Runs `future` with a tenant slot initialised to `initial`.
///
/// Nested scopes shadow the outer one; the outer value is visible again once
/// the inner future completes.
pub async fn scope<F>(initial: Option<TenantId>, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_TENANT.scope(Cell::new(initial), future).await
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<R>(initial: Option<TenantId>, f: impl FnOnce() -> R) -> R {
    CURRENT_TENANT.sync_scope(Cell::new(initial), f)
}

/// Returns `true` if the caller is running inside a tenant scope.
pub fn in_scope() -> bool {
    CURRENT_TENANT.try_with(|_| ()).is_ok()
}

/// Overwrites the tenant id held by the current scope.
///
/// Outside a scope this is a no-op; a warning is logged because it usually
/// means a code path runs outside the tenant middleware.
#[track_caller]
pub fn set_tenant_id(tenant_id: Option<TenantId>) {
    let caller = caller_label(Some(Location::caller()));
    if CURRENT_TENANT.try_with(|slot| slot.set(tenant_id)).is_err() {
        warn!(
            tenant_id = ?tenant_id,
            caller = %caller,
            "set_tenant_id called outside a tenant scope; value discarded"
        );
    }
}

/// Returns the tenant id held by the current scope.
///
/// Every read emits a debug record naming the resolved value and the calling
/// location, which makes scope leaks traceable in the logs.
#[track_caller]
pub fn tenant_id() -> Option<TenantId> {
    let caller = caller_label(Some(Location::caller()));
    let tenant_id = CURRENT_TENANT.try_with(Cell::get).ok().flatten();
    debug!(tenant_id = ?tenant_id, caller = %caller, "Resolved tenant from request scope");
    tenant_id
}

/// Resets the current scope's tenant id to absent.
#[track_caller]
pub fn clear_tenant_id() {
    // Clearing outside a scope is already the desired state.
    let _ = CURRENT_TENANT.try_with(|slot| slot.set(None));
}

/// Formats a caller location as `file:line`.
fn caller_label(location: Option<&Location<'_>>) -> String {
    match location {
        Some(location) if !location.file().is_empty() => {
            format!("{}:{}", location.file(), location.line())
        }
        _ => UNKNOWN_CALLER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scope_exposes_initial_value() {
        let seen = scope(Some(TenantId::new(7)), async { tenant_id() }).await;
        assert_eq!(seen, Some(TenantId::new(7)));
    }

    #[tokio::test]
    async fn test_set_overwrites_and_clear_resets() {
        scope(None, async {
            assert_eq!(tenant_id(), None);

            set_tenant_id(Some(TenantId::new(3)));
            assert_eq!(tenant_id(), Some(TenantId::new(3)));

            set_tenant_id(Some(TenantId::new(4)));
            assert_eq!(tenant_id(), Some(TenantId::new(4)));

            clear_tenant_id();
            assert_eq!(tenant_id(), None);
        })
        .await;
    }

    #[tokio::test]
    async fn test_value_does_not_outlive_scope() {
        scope(Some(TenantId::new(1)), async {
            set_tenant_id(Some(TenantId::new(2)));
        })
        .await;

        assert!(!in_scope());
        assert_eq!(tenant_id(), None);
    }

    #[test]
    fn test_operations_outside_scope_are_total() {
        set_tenant_id(Some(TenantId::new(5)));
        clear_tenant_id();
        assert_eq!(tenant_id(), None);
    }

    #[test]
    fn test_sync_scope() {
        let seen = sync_scope(Some(TenantId::new(11)), || {
            assert!(in_scope());
            tenant_id()
        });
        assert_eq!(seen, Some(TenantId::new(11)));
    }

    #[tokio::test]
    async fn test_nested_scope_shadows_outer() {
        scope(Some(TenantId::new(1)), async {
            let inner = scope(Some(TenantId::new(2)), async { tenant_id() }).await;
            assert_eq!(inner, Some(TenantId::new(2)));
            assert_eq!(tenant_id(), Some(TenantId::new(1)));
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scopes_are_isolated() {
        let mut handles = Vec::new();
        for id in 0..16 {
            handles.push(tokio::spawn(scope(Some(TenantId::new(id)), async move {
                tokio::task::yield_now().await;
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                (id, tenant_id())
            })));
        }

        for handle in handles {
            let (id, seen) = handle.await.unwrap();
            assert_eq!(seen, Some(TenantId::new(id)));
        }
    }

    #[test]
    fn test_caller_label() {
        assert_eq!(caller_label(None), UNKNOWN_CALLER);
        let label = caller_label(Some(Location::caller()));
        assert!(label.contains("current.rs:"));
    }
}
