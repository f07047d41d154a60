//! SQL query building.
//!
//! A deliberately small builder for the `SELECT` statements the storage layer
//! issues against tenant-owned tables. Conditions are stored as
//! [`SqlFragment`]s with positional `?` placeholders, so fragments can be
//! appended in any order and their parameters stay aligned.
//!
//! Tenant filtering is not done here: the
//! [`TenantScope`](crate::strategy::TenantScope) adds its predicate through
//! [`SelectQuery::filter`] like any other condition.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// The SQL clause.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a parameter from an optional value, mapping `None` to `NULL`.
    pub fn optional<T: Into<SqlParam>>(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Integer(value)
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::String(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::String(value.to_string())
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        SqlParam::Float(value)
    }
}

impl SqlFragment {
    /// Creates a new SQL fragment without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Creates an equality condition `column = ?`.
    pub fn eq(column: impl fmt::Display, value: impl Into<SqlParam>) -> Self {
        Self::with_params(format!("{} = ?", column), vec![value.into()])
    }

    /// Combines with another fragment using AND.
    pub fn and(mut self, other: SqlFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) AND ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

/// Builds a `SELECT` statement against a single table.
///
/// # Example
///
/// ```
/// use tracekeep_persistence::query::{SelectQuery, SortOrder, SqlFragment, SqlParam};
///
/// let mut query = SelectQuery::new("events", "e").columns(&["id", "event_type"]);
/// query.filter(SqlFragment::eq("e.event_type", "harvest"));
/// let query = query.order_by("e.id", SortOrder::Desc).limit(10);
///
/// let built = query.build();
/// assert_eq!(
///     built.sql,
///     "SELECT e.id, e.event_type FROM events e WHERE e.event_type = ? ORDER BY e.id DESC LIMIT 10"
/// );
/// assert_eq!(built.params, vec![SqlParam::string("harvest")]);
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: String,
    alias: String,
    columns: Vec<String>,
    conditions: Vec<SqlFragment>,
    order_by: Vec<(String, SortOrder)>,
    limit: Option<usize>,
}

impl SelectQuery {
    /// Creates a query selecting every column of `table`, aliased as `alias`.
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            columns: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Sets the selected columns; they are qualified with the table alias.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the table alias.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Qualifies a column name with this query's alias.
    pub fn qualify(&self, column: &str) -> String {
        format!("{}.{}", self.alias, column)
    }

    /// Adds a condition; all conditions are combined with AND.
    pub fn filter(&mut self, condition: SqlFragment) -> &mut Self {
        if !condition.is_empty() {
            self.conditions.push(condition);
        }
        self
    }

    /// Returns the number of conditions added so far.
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Appends an `ORDER BY` term.
    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    /// Sets the row limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders a `SELECT COUNT(*)` over the same table and conditions.
    ///
    /// Ordering and limit are ignored.
    pub fn build_count(&self) -> SqlFragment {
        let mut sql = format!("SELECT COUNT(*) FROM {} {}", self.table, self.alias);
        let params = self.append_conditions(&mut sql);
        SqlFragment::with_params(sql, params)
    }

    fn append_conditions(&self, sql: &mut String) -> Vec<SqlParam> {
        let mut params = Vec::new();
        if !self.conditions.is_empty() {
            let clauses: Vec<&str> = self.conditions.iter().map(|c| c.sql.as_str()).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
            for condition in &self.conditions {
                params.extend(condition.params.iter().cloned());
            }
        }
        params
    }

    /// Renders the statement and its parameters.
    pub fn build(&self) -> SqlFragment {
        let columns = if self.columns.is_empty() {
            format!("{}.*", self.alias)
        } else {
            self.columns
                .iter()
                .map(|c| self.qualify(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {} {}", columns, self.table, self.alias);
        let params = self.append_conditions(&mut sql);

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, order)| format!("{} {}", column, order))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        SqlFragment::with_params(sql, params)
    }
}
