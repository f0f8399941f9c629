use std::sync::Arc;

use futures_util::future::try_join_all;
use uuid::Uuid;

use crate::store::{RowFilter, StoreClient};

use super::errors::IncidentError;
use super::model::{
    assemble, decode, AffectedSystemRow, AssignedUserRow, Incident, IncidentRow, TimelineEventRow,
};
use super::{AFFECTED_SYSTEMS, ASSIGNED_USERS, INCIDENTS, TIMELINE_EVENTS};

// ============================================================================
// Aggregate Reader
// ============================================================================
//
// Reconstructs incident aggregates from one parent lookup plus three child
// lookups per incident. The store cannot join, so fetch_all issues 1 + 3n
// calls for n incidents; the three child lookups of one incident run
// concurrently. Known performance hotspot, not a correctness concern.
//
// ============================================================================

pub struct IncidentReader {
    store: Arc<dyn StoreClient>,
}

impl IncidentReader {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// All incidents with their children attached, newest first.
    pub async fn fetch_all(&self) -> Result<Vec<Incident>, IncidentError> {
        let rows = self.store.select(INCIDENTS, RowFilter::new()).await?;
        let parents = rows
            .into_iter()
            .map(|row| decode::<IncidentRow>(INCIDENTS, row))
            .collect::<Result<Vec<_>, _>>()?;

        let mut incidents =
            try_join_all(parents.into_iter().map(|parent| self.load_children(parent))).await?;
        incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!(count = incidents.len(), "fetched incident aggregates");
        Ok(incidents)
    }

    /// One incident by id, or `None` when no such row exists. Any failure
    /// other than the store's no-rows condition propagates.
    pub async fn fetch_one(&self, id: Uuid) -> Result<Option<Incident>, IncidentError> {
        let row = match self
            .store
            .select_one(INCIDENTS, RowFilter::new().eq("id", id.to_string()))
            .await
        {
            Ok(row) => row,
            Err(err) if err.is_no_rows() => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let parent = decode::<IncidentRow>(INCIDENTS, row)?;
        Ok(Some(self.load_children(parent).await?))
    }

    async fn load_children(&self, parent: IncidentRow) -> Result<Incident, IncidentError> {
        let scoped = RowFilter::new().eq("incident_id", parent.id.to_string());
        let (assigned, systems, timeline) = tokio::try_join!(
            self.assigned_user(scoped.clone()),
            self.affected_systems(scoped.clone()),
            self.timeline_events(scoped),
        )?;
        Ok(assemble(parent, assigned, systems, timeline))
    }

    async fn assigned_user(
        &self,
        scoped: RowFilter,
    ) -> Result<Option<AssignedUserRow>, IncidentError> {
        match self.store.select_one(ASSIGNED_USERS, scoped).await {
            Ok(row) => Ok(Some(decode(ASSIGNED_USERS, row)?)),
            Err(err) if err.is_no_rows() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn affected_systems(
        &self,
        scoped: RowFilter,
    ) -> Result<Vec<AffectedSystemRow>, IncidentError> {
        self.store
            .select(AFFECTED_SYSTEMS, scoped)
            .await?
            .into_iter()
            .map(|row| decode(AFFECTED_SYSTEMS, row))
            .collect()
    }

    async fn timeline_events(
        &self,
        scoped: RowFilter,
    ) -> Result<Vec<TimelineEventRow>, IncidentError> {
        self.store
            .select(TIMELINE_EVENTS, scoped)
            .await?
            .into_iter()
            .map(|row| decode(TIMELINE_EVENTS, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::incident::model::{IncidentSeverity, IncidentStatus, NewIncident};
    use crate::domain::incident::writer::IncidentWriter;
    use crate::domain::schema;
    use crate::store::MemoryStore;

    fn new_incident(title: &str) -> NewIncident {
        NewIncident {
            title: title.to_string(),
            description: "test incident".to_string(),
            severity: IncidentSeverity::Medium,
            status: IncidentStatus::Open,
            kind: "malware".to_string(),
            additional_details: None,
            assigned_user: None,
            affected_systems: Vec::new(),
            timeline: Vec::new(),
        }
    }

    #[tokio::test]
    async fn fetch_one_absent_is_none() {
        let store: Arc<dyn StoreClient> = Arc::new(MemoryStore::new(schema()));
        let reader = IncidentReader::new(store);

        let found = reader.fetch_one(Uuid::new_v4()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn fetch_all_returns_newest_first() {
        let store: Arc<dyn StoreClient> = Arc::new(MemoryStore::new(schema()));
        let writer = IncidentWriter::new(store.clone());
        let reader = IncidentReader::new(store);

        writer.create(&new_incident("first")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        writer.create(&new_incident("second")).await.unwrap();

        let incidents = reader.fetch_all().await.unwrap();
        assert_eq!(incidents.len(), 2);
        assert_eq!(incidents[0].title, "second");
        assert_eq!(incidents[1].title, "first");
    }

    #[tokio::test]
    async fn fetch_one_attaches_children() {
        let store: Arc<dyn StoreClient> = Arc::new(MemoryStore::new(schema()));
        let writer = IncidentWriter::new(store.clone());
        let reader = IncidentReader::new(store);

        let mut input = new_incident("with children");
        input.affected_systems = vec!["mail-gateway".to_string(), "vpn".to_string()];
        let created = writer.create(&input).await.unwrap();

        let fetched = reader.fetch_one(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.affected_systems.len(), 2);
        assert!(fetched.assigned_user.is_none());
        assert!(fetched.timeline.is_empty());
    }
}
