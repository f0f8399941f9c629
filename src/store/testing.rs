use std::sync::Arc;

use async_trait::async_trait;

use super::client::{Row, RowFilter, StoreClient};
use super::error::StoreError;

// ============================================================================
// Fault-Injecting Store Wrapper (tests only)
// ============================================================================

/// Wraps a real store and fails specific write operations on one table,
/// so tests can exercise the partial-failure policies of the write paths.
pub(crate) struct FlakyStore {
    inner: Arc<dyn StoreClient>,
    fail_insert_into: Option<&'static str>,
    fail_update_on: Option<&'static str>,
    fail_delete_from: Option<&'static str>,
}

impl FlakyStore {
    pub(crate) fn wrapping(inner: Arc<dyn StoreClient>) -> Self {
        Self {
            inner,
            fail_insert_into: None,
            fail_update_on: None,
            fail_delete_from: None,
        }
    }

    pub(crate) fn failing_inserts(mut self, table: &'static str) -> Self {
        self.fail_insert_into = Some(table);
        self
    }

    pub(crate) fn failing_updates(mut self, table: &'static str) -> Self {
        self.fail_update_on = Some(table);
        self
    }

    pub(crate) fn failing_deletes(mut self, table: &'static str) -> Self {
        self.fail_delete_from = Some(table);
        self
    }

    fn injected() -> StoreError {
        StoreError::Backend("injected failure".to_string())
    }
}

#[async_trait]
impl StoreClient for FlakyStore {
    async fn select(&self, table: &str, filter: RowFilter) -> Result<Vec<Row>, StoreError> {
        self.inner.select(table, filter).await
    }

    async fn select_one(&self, table: &str, filter: RowFilter) -> Result<Row, StoreError> {
        self.inner.select_one(table, filter).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        if self.fail_insert_into == Some(table) {
            return Err(Self::injected());
        }
        self.inner.insert(table, rows).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Row,
        filter: RowFilter,
    ) -> Result<Vec<Row>, StoreError> {
        if self.fail_update_on == Some(table) {
            return Err(Self::injected());
        }
        self.inner.update(table, patch, filter).await
    }

    async fn delete(&self, table: &str, filter: RowFilter) -> Result<(), StoreError> {
        if self.fail_delete_from == Some(table) {
            return Err(Self::injected());
        }
        self.inner.delete(table, filter).await
    }
}
