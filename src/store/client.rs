use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::StoreError;

// ============================================================================
// Remote Store Contract
// ============================================================================
//
// The tracker's data lives in a remote relational store reached through a
// narrow table-level API: equality-filtered select/insert/update/delete,
// no joins, no multi-statement transactions. Rows cross this boundary as
// JSON objects; the domain layer owns the typed view of each table.
//
// ============================================================================

/// A single table row as it crosses the store boundary.
pub type Row = serde_json::Map<String, Value>;

/// Equality-only conjunction of column constraints.
///
/// An empty filter matches every row of the table.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    conditions: Vec<(String, Value)>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an `column = value` constraint.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, value)| row.get(column.as_str()) == Some(value))
    }
}

/// The remote store client consumed by the data layer.
///
/// Implementations are expected to be cheap to share behind an `Arc`; all
/// relationship traversal happens above this trait via repeated keyed
/// lookups.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// All rows matching the filter.
    async fn select(&self, table: &str, filter: RowFilter) -> Result<Vec<Row>, StoreError>;

    /// Exactly one row. `StoreError::NoRows` is the distinguished
    /// no-matching-row condition; everything else is a plain failure.
    async fn select_one(&self, table: &str, filter: RowFilter) -> Result<Row, StoreError>;

    /// Insert rows and return them with store-generated columns filled in.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Apply a column patch to every matching row; returns the updated rows.
    async fn update(&self, table: &str, patch: Row, filter: RowFilter)
        -> Result<Vec<Row>, StoreError>;

    /// Delete every matching row.
    async fn delete(&self, table: &str, filter: RowFilter) -> Result<(), StoreError>;
}

/// Serialize a value into a store row.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, serde_json::Error> {
    use serde::ser::Error;
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde_json::Error::custom(format!(
            "expected a JSON object row, got {other}"
        ))),
    }
}

/// Deserialize a store row into a typed value.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(row))
}
