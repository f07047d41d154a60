//! EventStorage, ReferenceStorage and ExistenceOracle implementations for SQLite.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::types::{ToSqlOutput, Type, Value as SqlValue};
use rusqlite::{OptionalExtension, Row, ToSql, params};
use tracing::debug;
use uuid::Uuid;

use crate::core::{EventStorage, ExistenceOracle, ReferenceStorage};
use crate::error::StorageResult;
use crate::query::{SelectQuery, SortOrder, SqlFragment, SqlParam};
use crate::tenant::{TenantContext, TenantId};
use crate::types::{Collection, EventQuery, EventType, NewEvent, ReferenceRecord, StoredEvent};

use super::SqliteBackend;
use super::backend::{BACKEND_NAME, internal_error};

const EVENTS: &str = "events";

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::String(s) => ToSqlOutput::from(s.as_str()),
            SqlParam::Integer(i) => ToSqlOutput::from(*i),
            SqlParam::Float(f) => ToSqlOutput::from(*f),
            SqlParam::Null => ToSqlOutput::Owned(SqlValue::Null),
        })
    }
}

fn param_refs(params: &[SqlParam]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}

fn conversion_error(index: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
}

impl SqliteBackend {
    /// Column list for event reads; the tenant column name is configurable.
    fn event_columns(&self) -> Vec<&str> {
        vec![
            "id",
            "uid",
            self.tenant_scope().tenant_column(),
            "event_type",
            "area_id",
            "facility_id",
            "user_id",
            "batch_id",
            "new_batch_id",
            "from_location",
            "to_location",
            "from_sub_location",
            "to_sub_location",
            "quantity",
            "unit",
            "reason",
            "description",
            "method",
            "recorded_at",
        ]
    }

    fn event_query(&self) -> SelectQuery {
        SelectQuery::new(EVENTS, "e").columns(&self.event_columns())
    }

    fn query_events(&self, query: &SelectQuery) -> StorageResult<Vec<StoredEvent>> {
        let built = query.build();
        let conn = self.get_connection()?;
        let mut stmt = conn
            .prepare(&built.sql)
            .map_err(|e| internal_error("Failed to prepare event query", e))?;
        let rows = stmt
            .query_map(param_refs(&built.params).as_slice(), row_to_event)
            .map_err(|e| internal_error("Failed to query events", e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| internal_error("Failed to read event row", e))
    }
}

/// Maps a row selected with [`SqliteBackend::event_columns`].
fn row_to_event(row: &Row<'_>) -> rusqlite::Result<StoredEvent> {
    let uid: String = row.get(1)?;
    let uid = Uuid::parse_str(&uid).map_err(|e| conversion_error(1, e.to_string()))?;
    let tenant_id: Option<i64> = row.get(2)?;
    let event_type: String = row.get(3)?;
    let event_type = EventType::from_str(&event_type).map_err(|e| conversion_error(3, e))?;
    let quantity: Option<String> = row.get(13)?;
    let quantity = quantity
        .map(|q| Decimal::from_str(&q).map_err(|e| conversion_error(13, e.to_string())))
        .transpose()?;
    let recorded_at: String = row.get(18)?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|e| conversion_error(18, e.to_string()))?
        .with_timezone(&Utc);

    let tenant_id = tenant_id.map(TenantId::new);
    Ok(StoredEvent {
        id: row.get(0)?,
        uid,
        event: NewEvent {
            event_type,
            area_id: row.get(4)?,
            facility_id: row.get(5)?,
            user_id: row.get(6)?,
            batch_id: row.get(7)?,
            new_batch_id: row.get(8)?,
            from_location: row.get(9)?,
            to_location: row.get(10)?,
            from_sub_location: row.get(11)?,
            to_sub_location: row.get(12)?,
            quantity,
            unit: row.get(14)?,
            reason: row.get(15)?,
            description: row.get(16)?,
            method: row.get(17)?,
            tenant_id,
        },
        recorded_at,
    })
}

#[async_trait]
impl EventStorage for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.check_connection()
    }

    async fn record_event(
        &self,
        tenant: &TenantContext,
        event: NewEvent,
    ) -> StorageResult<StoredEvent> {
        let tenant_id = self
            .tenant_scope()
            .stamp_tenant(tenant, EVENTS, event.tenant_id)?;

        let uid = Uuid::new_v4();
        let recorded_at = Utc::now();
        let conn = self.get_connection()?;

        let sql = format!(
            "INSERT INTO events (uid, {}, event_type, area_id, facility_id, user_id, batch_id,
                new_batch_id, from_location, to_location, from_sub_location, to_sub_location,
                quantity, unit, reason, description, method, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            self.tenant_scope().tenant_column()
        );
        conn.execute(
            &sql,
            params![
                uid.to_string(),
                tenant_id.map(TenantId::get),
                event.event_type.as_str(),
                event.area_id,
                event.facility_id,
                event.user_id,
                event.batch_id,
                event.new_batch_id,
                event.from_location,
                event.to_location,
                event.from_sub_location,
                event.to_sub_location,
                event.quantity.map(|q| q.to_string()),
                event.unit,
                event.reason,
                event.description,
                event.method,
                recorded_at.to_rfc3339(),
            ],
        )
        .map_err(|e| internal_error("Failed to insert event", e))?;
        let id = conn.last_insert_rowid();

        debug!(
            id,
            uid = %uid,
            event_type = %event.event_type,
            tenant_id = ?tenant_id,
            "Recorded event"
        );

        Ok(StoredEvent {
            id,
            uid,
            event: NewEvent { tenant_id, ..event },
            recorded_at,
        })
    }

    async fn read_event(
        &self,
        tenant: &TenantContext,
        id: i64,
    ) -> StorageResult<Option<StoredEvent>> {
        let mut query = self.event_query();
        query.filter(SqlFragment::eq(query.qualify("id"), id));
        self.tenant_scope().scope_query(tenant, EVENTS, &mut query)?;

        Ok(self.query_events(&query)?.into_iter().next())
    }

    async fn list_events(
        &self,
        tenant: &TenantContext,
        filter: &EventQuery,
    ) -> StorageResult<Vec<StoredEvent>> {
        let mut query = self.event_query();
        if let Some(event_type) = filter.event_type {
            query.filter(SqlFragment::eq(query.qualify("event_type"), event_type.as_str()));
        }
        if let Some(batch_id) = filter.batch_id {
            query.filter(SqlFragment::eq(query.qualify("batch_id"), batch_id));
        }
        if let Some(facility_id) = filter.facility_id {
            query.filter(SqlFragment::eq(query.qualify("facility_id"), facility_id));
        }
        self.tenant_scope().scope_query(tenant, EVENTS, &mut query)?;

        let query = query
            .order_by("e.id", SortOrder::Desc)
            .limit(filter.effective_limit());
        self.query_events(&query)
    }

    async fn count_events(&self, tenant: &TenantContext) -> StorageResult<u64> {
        let mut query = SelectQuery::new(EVENTS, "e");
        self.tenant_scope().scope_query(tenant, EVENTS, &mut query)?;

        let built = query.build_count();
        let conn = self.get_connection()?;
        let count: i64 = conn
            .query_row(&built.sql, param_refs(&built.params).as_slice(), |row| {
                row.get(0)
            })
            .map_err(|e| internal_error("Failed to count events", e))?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl ReferenceStorage for SqliteBackend {
    async fn create_reference(
        &self,
        tenant: &TenantContext,
        collection: Collection,
        name: &str,
    ) -> StorageResult<ReferenceRecord> {
        let table = collection.table_name();
        let tenant_id = if collection.is_tenant_owned() {
            self.tenant_scope().stamp_tenant(tenant, table, None)?
        } else {
            None
        };

        let conn = self.get_connection()?;
        let created_at = Utc::now().to_rfc3339();
        if collection.is_tenant_owned() {
            conn.execute(
                &format!(
                    "INSERT INTO {} ({}, name, created_at) VALUES (?1, ?2, ?3)",
                    table,
                    self.tenant_scope().tenant_column()
                ),
                params![tenant_id.map(TenantId::get), name, created_at],
            )
        } else {
            conn.execute(
                &format!("INSERT INTO {} (name, created_at) VALUES (?1, ?2)", table),
                params![name, created_at],
            )
        }
        .map_err(|e| internal_error(&format!("Failed to insert into {}", table), e))?;

        Ok(ReferenceRecord {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            tenant_id,
        })
    }

    async fn list_references(
        &self,
        tenant: &TenantContext,
        collection: Collection,
    ) -> StorageResult<Vec<ReferenceRecord>> {
        let table = collection.table_name();
        let owned = collection.is_tenant_owned();

        let mut query = if owned {
            SelectQuery::new(table, "r").columns(&["id", "name", self.tenant_scope().tenant_column()])
        } else {
            SelectQuery::new(table, "r").columns(&["id", "name"])
        };
        if owned {
            self.tenant_scope().scope_query(tenant, table, &mut query)?;
        }
        let query = query.order_by("r.id", SortOrder::Asc);

        let built = query.build();
        let conn = self.get_connection()?;
        let mut stmt = conn
            .prepare(&built.sql)
            .map_err(|e| internal_error("Failed to prepare reference query", e))?;
        let rows = stmt
            .query_map(param_refs(&built.params).as_slice(), |row| {
                let tenant_id: Option<i64> = if owned { row.get(2)? } else { None };
                Ok(ReferenceRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    tenant_id: tenant_id.map(TenantId::new),
                })
            })
            .map_err(|e| internal_error("Failed to query references", e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| internal_error("Failed to read reference row", e))
    }
}

#[async_trait]
impl ExistenceOracle for SqliteBackend {
    async fn exists(
        &self,
        tenant: &TenantContext,
        collection: Collection,
        id: i64,
    ) -> StorageResult<bool> {
        let table = collection.table_name();
        let mut query = SelectQuery::new(table, "r").columns(&["id"]);
        query.filter(SqlFragment::eq(query.qualify("id"), id));
        if collection.is_tenant_owned() {
            self.tenant_scope().scope_query(tenant, table, &mut query)?;
        }
        let built = query.limit(1).build();

        let conn = self.get_connection()?;
        let found = conn
            .query_row(&built.sql, param_refs(&built.params).as_slice(), |_| Ok(()))
            .optional()
            .map_err(|e| internal_error("Failed to check existence", e))?
            .is_some();
        debug!(collection = %collection, id, found, "Checked reference existence");
        Ok(found)
    }
}
