use std::sync::Arc;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::store::{RowFilter, StoreClient};

use super::errors::CredentialLeakError;
use super::model::{
    decode, encode, AuditAction, AuditEntryRow, CredentialLeak, CredentialLeakAuditEntry,
    CredentialLeakRow, NewAuditEntryRow,
};
use super::CREDENTIAL_LEAK_LOGS;

// ============================================================================
// Credential Leak Audit Recorder
// ============================================================================
//
// Append-only change log for credential-leak records. Entries snapshot the
// row shape of the subject:
//
// - CREATE: { "new": <post-state> }
// - UPDATE: { "old": <pre-state>, "new": <post-state>,
//             "changed_fields": <column -> new value for every diff> }
// - DELETE: { "old": <pre-state> }
//
// The log table carries no enforced reference to the subject table, so an
// entry stays valid and queryable after its subject row is deleted.
//
// ============================================================================

pub struct CredentialLeakAudit {
    store: Arc<dyn StoreClient>,
    actor_id: Option<Uuid>,
}

impl CredentialLeakAudit {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self {
            store,
            actor_id: None,
        }
    }

    /// Stamp subsequent entries with the acting user.
    pub fn with_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub async fn record_created(&self, leak: &CredentialLeak) -> Result<(), CredentialLeakError> {
        let new = snapshot(leak)?;
        self.append(leak.id, AuditAction::Create, json!({ "new": new }))
            .await
    }

    pub async fn record_updated(
        &self,
        old: &CredentialLeak,
        new: &CredentialLeak,
    ) -> Result<(), CredentialLeakError> {
        let old_snapshot = snapshot(old)?;
        let new_snapshot = snapshot(new)?;
        let changed_fields = changed_fields(&old_snapshot, &new_snapshot);
        self.append(
            new.id,
            AuditAction::Update,
            json!({
                "old": old_snapshot,
                "new": new_snapshot,
                "changed_fields": changed_fields,
            }),
        )
        .await
    }

    pub async fn record_deleted(&self, old: &CredentialLeak) -> Result<(), CredentialLeakError> {
        let old_snapshot = snapshot(old)?;
        self.append(old.id, AuditAction::Delete, json!({ "old": old_snapshot }))
            .await
    }

    /// All entries for a subject, newest first. Works purely against the
    /// log table, whether or not the subject still exists.
    pub async fn fetch_logs(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<CredentialLeakAuditEntry>, CredentialLeakError> {
        let rows = self
            .store
            .select(
                CREDENTIAL_LEAK_LOGS,
                RowFilter::new().eq("credential_leak_id", subject_id.to_string()),
            )
            .await?;
        let mut entries = rows
            .into_iter()
            .map(|row| decode::<AuditEntryRow>(CREDENTIAL_LEAK_LOGS, row))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(CredentialLeakAuditEntry::from)
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn append(
        &self,
        subject_id: Uuid,
        action: AuditAction,
        details: Value,
    ) -> Result<(), CredentialLeakError> {
        let row = encode(
            CREDENTIAL_LEAK_LOGS,
            &NewAuditEntryRow {
                credential_leak_id: subject_id,
                action,
                details,
                user_id: self.actor_id,
            },
        )?;
        self.store.insert(CREDENTIAL_LEAK_LOGS, vec![row]).await?;
        tracing::debug!(subject_id = %subject_id, action = ?action, "audit entry appended");
        Ok(())
    }
}

fn snapshot(leak: &CredentialLeak) -> Result<Value, CredentialLeakError> {
    serde_json::to_value(CredentialLeakRow::from(leak)).map_err(|source| {
        CredentialLeakError::InvalidRow {
            table: CREDENTIAL_LEAK_LOGS,
            source,
        }
    })
}

/// Column -> new value, for every column whose value differs between the
/// two snapshots.
fn changed_fields(old: &Value, new: &Value) -> Value {
    let mut changed = Map::new();
    if let (Value::Object(old), Value::Object(new)) = (old, new) {
        for (column, value) in new {
            if old.get(column) != Some(value) {
                changed.insert(column.clone(), value.clone());
            }
        }
    }
    Value::Object(changed)
}
