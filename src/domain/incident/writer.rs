use std::sync::Arc;

use uuid::Uuid;

use crate::store::{RowFilter, StoreClient, StoreError};

use super::errors::IncidentError;
use super::model::{
    decode, encode, AffectedSystemRow, AssignedUser, AssignedUserRow, Incident, IncidentRow,
    IncidentScalarsRow, NewIncident, TimelineEvent, TimelineEventRow,
};
use super::reader::IncidentReader;
use super::{AFFECTED_SYSTEMS, ASSIGNED_USERS, INCIDENTS, TIMELINE_EVENTS};

// ============================================================================
// Aggregate Writer
// ============================================================================
//
// Create and update orchestration across the parent table and its three
// child tables. The store has no multi-statement transactions, so each
// operation is an explicit sequence of calls with its own failure policy:
//
// - The parent write always aborts the operation on failure.
// - Child writes are best-effort: a failed child step is logged and the
//   operation carries on. An incident missing some children is worth more
//   than no incident at all.
// - Assigned user and affected systems are synchronized with replace-all
//   (delete the scoped set, insert the desired set). Timeline events are
//   never rewritten by update; they only grow through create and
//   append_timeline_event.
//
// Both create and update hand their result back through the reader, so the
// caller always sees store ground truth and a dropped child is visible.
//
// ============================================================================

pub struct IncidentWriter {
    store: Arc<dyn StoreClient>,
    reader: IncidentReader,
}

impl IncidentWriter {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        let reader = IncidentReader::new(store.clone());
        Self { store, reader }
    }

    pub async fn create(&self, input: &NewIncident) -> Result<Incident, IncidentError> {
        let row = encode(INCIDENTS, &IncidentScalarsRow::from(input))?;
        let inserted = self
            .store
            .insert(INCIDENTS, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no rows".to_string()))?;
        let parent: IncidentRow = decode(INCIDENTS, inserted)?;
        let id = parent.id;
        tracing::info!(incident_id = %id, title = %input.title, "incident created");

        if let Some(user) = &input.assigned_user {
            if let Err(err) = self.insert_assigned_user(id, user).await {
                tracing::warn!(incident_id = %id, error = %err,
                    "could not attach assigned user; keeping the incident without one");
            }
        }
        if !input.affected_systems.is_empty() {
            if let Err(err) = self
                .insert_affected_systems(id, &input.affected_systems)
                .await
            {
                tracing::warn!(incident_id = %id, error = %err,
                    "could not attach affected systems; keeping partial aggregate");
            }
        }
        if !input.timeline.is_empty() {
            if let Err(err) = self.insert_timeline_events(id, &input.timeline).await {
                tracing::warn!(incident_id = %id, error = %err,
                    "could not attach timeline events; keeping partial aggregate");
            }
        }

        self.require(id).await
    }

    pub async fn update(&self, incident: &Incident) -> Result<Incident, IncidentError> {
        let patch = encode(INCIDENTS, &IncidentScalarsRow::from(incident))?;
        self.store
            .update(
                INCIDENTS,
                patch,
                RowFilter::new().eq("id", incident.id.to_string()),
            )
            .await?;

        if let Err(err) = self
            .replace_assigned_user(incident.id, incident.assigned_user.as_ref())
            .await
        {
            tracing::warn!(incident_id = %incident.id, error = %err,
                "assigned user replacement failed");
        }
        if let Err(err) = self
            .replace_affected_systems(incident.id, &incident.affected_systems)
            .await
        {
            tracing::warn!(incident_id = %incident.id, error = %err,
                "affected systems replacement failed");
        }
        // Timeline events are append-only; update never rewrites them.

        self.require(incident.id).await
    }

    /// The dedicated append path for timeline events.
    pub async fn append_timeline_event(
        &self,
        id: Uuid,
        event: &TimelineEvent,
    ) -> Result<(), IncidentError> {
        let row = encode(
            TIMELINE_EVENTS,
            &TimelineEventRow {
                incident_id: id,
                event: event.event.clone(),
                time: event.time,
            },
        )?;
        self.store.insert(TIMELINE_EVENTS, vec![row]).await?;
        Ok(())
    }

    /// Delete the scoped set, insert the desired set. An empty desired set
    /// clears the relation.
    async fn replace_assigned_user(
        &self,
        id: Uuid,
        user: Option<&AssignedUser>,
    ) -> Result<(), IncidentError> {
        self.store
            .delete(
                ASSIGNED_USERS,
                RowFilter::new().eq("incident_id", id.to_string()),
            )
            .await?;
        if let Some(user) = user {
            self.insert_assigned_user(id, user).await?;
        }
        Ok(())
    }

    async fn replace_affected_systems(
        &self,
        id: Uuid,
        systems: &[String],
    ) -> Result<(), IncidentError> {
        self.store
            .delete(
                AFFECTED_SYSTEMS,
                RowFilter::new().eq("incident_id", id.to_string()),
            )
            .await?;
        if !systems.is_empty() {
            self.insert_affected_systems(id, systems).await?;
        }
        Ok(())
    }

    async fn insert_assigned_user(
        &self,
        id: Uuid,
        user: &AssignedUser,
    ) -> Result<(), IncidentError> {
        let row = encode(
            ASSIGNED_USERS,
            &AssignedUserRow {
                incident_id: id,
                name: user.name.clone(),
                initials: user.initials.clone(),
            },
        )?;
        self.store.insert(ASSIGNED_USERS, vec![row]).await?;
        Ok(())
    }

    async fn insert_affected_systems(
        &self,
        id: Uuid,
        systems: &[String],
    ) -> Result<(), IncidentError> {
        let rows = systems
            .iter()
            .map(|name| {
                encode(
                    AFFECTED_SYSTEMS,
                    &AffectedSystemRow {
                        incident_id: id,
                        system_name: name.clone(),
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert(AFFECTED_SYSTEMS, rows).await?;
        Ok(())
    }

    async fn insert_timeline_events(
        &self,
        id: Uuid,
        events: &[TimelineEvent],
    ) -> Result<(), IncidentError> {
        let rows = events
            .iter()
            .map(|event| {
                encode(
                    TIMELINE_EVENTS,
                    &TimelineEventRow {
                        incident_id: id,
                        event: event.event.clone(),
                        time: event.time,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert(TIMELINE_EVENTS, rows).await?;
        Ok(())
    }

    /// Re-fetch the aggregate after a write; the store is the source of
    /// truth for what actually got attached.
    async fn require(&self, id: Uuid) -> Result<Incident, IncidentError> {
        self.reader
            .fetch_one(id)
            .await?
            .ok_or(IncidentError::MissingAfterWrite(id))
    }
}
