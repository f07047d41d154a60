//! Log records emitted by tenant resolution.
//!
//! An unfiltered query must leave a warning behind, and every read of the
//! request-scoped tenant must name its caller.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use tracekeep_persistence::query::SelectQuery;
use tracekeep_persistence::strategy::{SharedSchemaConfig, TenantScope};
use tracekeep_persistence::tenant::{TenantContext, TenantId, current};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter(Arc::clone(&self.0))
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a debug-level subscriber and returns what it wrote.
fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
    let sink = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);

    let bytes = sink.0.lock().expect("lock output").clone();
    (result, String::from_utf8(bytes).expect("utf8 log output"))
}

fn scope() -> TenantScope {
    TenantScope::new(SharedSchemaConfig::default()).unwrap()
}

#[test]
fn test_unfiltered_query_logs_warning_naming_entity() {
    let (condition_count, logs) = capture(|| {
        let mut query = SelectQuery::new("events", "e");
        scope()
            .scope_query(&TenantContext::new(), "events", &mut query)
            .unwrap();
        query.condition_count()
    });

    assert_eq!(condition_count, 0);
    let warning = logs
        .lines()
        .find(|line| line.contains("WARN"))
        .expect("warning line");
    assert!(warning.contains("events"), "{warning}");
    assert!(warning.contains("without tenant scope"), "{warning}");
}

#[test]
fn test_scoped_query_does_not_warn() {
    let (_, logs) = capture(|| {
        let mut query = SelectQuery::new("events", "e");
        scope()
            .scope_query(&TenantContext::for_tenant(TenantId::new(7)), "events", &mut query)
            .unwrap();
    });

    assert!(!logs.contains("WARN"), "{logs}");
    assert!(logs.contains("Applied tenant scope"), "{logs}");
}

#[test]
fn test_tenant_read_logs_value_and_caller() {
    let (seen, logs) = capture(|| {
        current::sync_scope(Some(TenantId::new(7)), || current::tenant_id())
    });

    assert_eq!(seen, Some(TenantId::new(7)));
    let record = logs
        .lines()
        .find(|line| line.contains("Resolved tenant from request scope"))
        .expect("tenant read record");
    assert!(record.contains("DEBUG"), "{record}");
    assert!(record.contains("tenant_id=Some(TenantId(7))"), "{record}");
    assert!(record.contains("caller="), "{record}");
    assert!(record.contains("tenant_logging.rs:"), "{record}");
}
