use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::client::{Row, RowFilter, StoreClient};
use super::error::StoreError;

// ============================================================================
// In-Memory Store Backend
// ============================================================================
//
// A table-per-Vec backend for tests and the demo binary. It reproduces the
// parts of the remote store's behavior the data layer depends on:
//
// 1. Generated columns: id on every table, created_at/updated_at where the
//    table declares them.
// 2. Write-time referential integrity: a child row must point at an
//    existing parent, and a referenced parent cannot be deleted.
//
// Tables without a declared reference (the audit log) intentionally get no
// integrity check, so their rows outlive the row they point at.
//
// ============================================================================

/// Declares one table: its name, generated timestamp columns, and an
/// optional enforced reference to a parent table.
#[derive(Debug, Clone)]
pub struct TableDef {
    name: String,
    created_at: bool,
    updated_at: bool,
    reference: Option<ForeignKey>,
}

#[derive(Debug, Clone)]
struct ForeignKey {
    column: String,
    parent_table: String,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: false,
            updated_at: false,
            reference: None,
        }
    }

    /// The store fills `created_at` on insert.
    pub fn with_created_at(mut self) -> Self {
        self.created_at = true;
        self
    }

    /// The store fills `updated_at` on insert and bumps it on update.
    pub fn with_updated_at(mut self) -> Self {
        self.updated_at = true;
        self
    }

    /// Enforce `column` as a reference to `parent_table.id`.
    pub fn with_reference(
        mut self,
        column: impl Into<String>,
        parent_table: impl Into<String>,
    ) -> Self {
        self.reference = Some(ForeignKey {
            column: column.into(),
            parent_table: parent_table.into(),
        });
        self
    }
}

pub struct MemoryStore {
    defs: HashMap<String, TableDef>,
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new(defs: Vec<TableDef>) -> Self {
        let tables = defs
            .iter()
            .map(|def| (def.name.clone(), Vec::new()))
            .collect();
        let defs = defs.into_iter().map(|def| (def.name.clone(), def)).collect();
        Self {
            defs,
            tables: RwLock::new(tables),
        }
    }

    fn def(&self, table: &str) -> Result<&TableDef, StoreError> {
        self.defs
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn select(&self, table: &str, filter: RowFilter) -> Result<Vec<Row>, StoreError> {
        self.def(table)?;
        let tables = self.tables.read().await;
        let rows = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        Ok(rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn select_one(&self, table: &str, filter: RowFilter) -> Result<Row, StoreError> {
        let mut rows = self.select(table, filter).await?;
        match rows.len() {
            0 => Err(StoreError::NoRows {
                table: table.to_string(),
            }),
            1 => Ok(rows.remove(0)),
            _ => Err(StoreError::MultipleRows {
                table: table.to_string(),
            }),
        }
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let def = self.def(table)?.clone();
        let mut tables = self.tables.write().await;

        // Validate references for the whole statement before touching state.
        if let Some(fk) = &def.reference {
            for row in &rows {
                let value = row.get(fk.column.as_str()).cloned().unwrap_or(Value::Null);
                let parent_exists = tables
                    .get(&fk.parent_table)
                    .is_some_and(|parents| parents.iter().any(|p| p.get("id") == Some(&value)));
                if !parent_exists {
                    return Err(StoreError::ForeignKey {
                        table: table.to_string(),
                        references: fk.parent_table.clone(),
                    });
                }
            }
        }

        let now = Value::String(Utc::now().to_rfc3339());
        let mut inserted = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.entry("id".to_string())
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            if def.created_at {
                row.entry("created_at".to_string()).or_insert(now.clone());
            }
            if def.updated_at {
                row.entry("updated_at".to_string()).or_insert(now.clone());
            }
            inserted.push(row);
        }

        let stored = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        stored.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn update(
        &self,
        table: &str,
        patch: Row,
        filter: RowFilter,
    ) -> Result<Vec<Row>, StoreError> {
        let def = self.def(table)?.clone();
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;

        let now = Value::String(Utc::now().to_rfc3339());
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| filter.matches(row)) {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            if def.updated_at {
                row.insert("updated_at".to_string(), now.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: RowFilter) -> Result<(), StoreError> {
        self.def(table)?;
        let mut tables = self.tables.write().await;

        let victims: Vec<Value> = tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?
            .iter()
            .filter(|row| filter.matches(row))
            .filter_map(|row| row.get("id").cloned())
            .collect();

        // Deleting a row that child tables still reference is restricted.
        for def in self.defs.values() {
            let Some(fk) = &def.reference else { continue };
            if fk.parent_table != table {
                continue;
            }
            let referenced = tables.get(&def.name).is_some_and(|children| {
                children.iter().any(|child| {
                    victims
                        .iter()
                        .any(|id| child.get(fk.column.as_str()) == Some(id))
                })
            });
            if referenced {
                return Err(StoreError::Restricted {
                    table: table.to_string(),
                    referenced_by: def.name.clone(),
                });
            }
        }

        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))?;
        rows.retain(|row| !filter.matches(row));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            TableDef::new("parents").with_created_at().with_updated_at(),
            TableDef::new("children").with_reference("parent_id", "parents"),
        ])
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[tokio::test]
    async fn insert_fills_generated_columns() {
        let store = store();
        let inserted = store
            .insert("parents", vec![row(&[("name", "alpha")])])
            .await
            .unwrap();

        let first = &inserted[0];
        assert!(first.get("id").is_some());
        assert!(first.get("created_at").is_some());
        assert!(first.get("updated_at").is_some());
    }

    #[tokio::test]
    async fn select_one_distinguishes_no_rows() {
        let store = store();
        let err = store
            .select_one("parents", RowFilter::new().eq("name", "missing"))
            .await
            .unwrap_err();
        assert!(err.is_no_rows());
    }

    #[tokio::test]
    async fn select_one_rejects_multiple_rows() {
        let store = store();
        store
            .insert(
                "parents",
                vec![row(&[("name", "dup")]), row(&[("name", "dup")])],
            )
            .await
            .unwrap();

        let err = store
            .select_one("parents", RowFilter::new().eq("name", "dup"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MultipleRows { .. }));
    }

    #[tokio::test]
    async fn orphan_child_insert_is_rejected() {
        let store = store();
        let err = store
            .insert(
                "children",
                vec![row(&[("parent_id", "no-such-parent"), ("name", "x")])],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { .. }));
    }

    #[tokio::test]
    async fn referenced_parent_cannot_be_deleted() {
        let store = store();
        let parent = store
            .insert("parents", vec![row(&[("name", "alpha")])])
            .await
            .unwrap()
            .remove(0);
        let parent_id = parent.get("id").unwrap().clone();

        let mut child = Row::new();
        child.insert("parent_id".to_string(), parent_id.clone());
        store.insert("children", vec![child]).await.unwrap();

        let err = store
            .delete("parents", RowFilter::new().eq("id", parent_id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Restricted { .. }));

        // Children first, then the parent goes through.
        store
            .delete("children", RowFilter::new().eq("parent_id", parent_id.clone()))
            .await
            .unwrap();
        store
            .delete("parents", RowFilter::new().eq("id", parent_id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_patches_and_bumps_updated_at() {
        let store = store();
        let inserted = store
            .insert("parents", vec![row(&[("name", "alpha")])])
            .await
            .unwrap()
            .remove(0);
        let before = inserted.get("updated_at").unwrap().clone();

        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let updated = store
            .update(
                "parents",
                row(&[("name", "beta")]),
                RowFilter::new().eq("id", inserted.get("id").unwrap().clone()),
            )
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(
            updated[0].get("name"),
            Some(&Value::String("beta".to_string()))
        );
        assert_ne!(updated[0].get("updated_at"), Some(&before));
    }

    #[tokio::test]
    async fn unknown_table_is_an_error() {
        let store = store();
        let err = store.select("nope", RowFilter::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownTable(_)));
    }
}
