use std::sync::Arc;

use uuid::Uuid;

use crate::store::{RowFilter, StoreClient};

use super::errors::IncidentError;
use super::{AFFECTED_SYSTEMS, ASSIGNED_USERS, INCIDENTS, TIMELINE_EVENTS};

// ============================================================================
// Aggregate Deleter
// ============================================================================

pub struct IncidentDeleter {
    store: Arc<dyn StoreClient>,
}

impl IncidentDeleter {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// Remove the aggregate, children before the parent; child rows hold a
    /// store-enforced reference to the incident.
    ///
    /// Unlike create/update, any failing step aborts and propagates. The
    /// four steps are still not atomic: a failure partway through can
    /// leave the aggregate half-deleted.
    pub async fn delete(&self, id: Uuid) -> Result<(), IncidentError> {
        let scoped = RowFilter::new().eq("incident_id", id.to_string());

        self.store.delete(ASSIGNED_USERS, scoped.clone()).await?;
        self.store.delete(AFFECTED_SYSTEMS, scoped.clone()).await?;
        self.store.delete(TIMELINE_EVENTS, scoped).await?;
        self.store
            .delete(INCIDENTS, RowFilter::new().eq("id", id.to_string()))
            .await?;

        tracing::info!(incident_id = %id, "incident deleted");
        Ok(())
    }
}
