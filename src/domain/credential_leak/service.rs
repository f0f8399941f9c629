use std::sync::Arc;

use uuid::Uuid;

use crate::store::{RowFilter, StoreClient, StoreError};

use super::audit::CredentialLeakAudit;
use super::errors::CredentialLeakError;
use super::model::{
    decode, encode, CredentialLeak, CredentialLeakPatch, CredentialLeakRow, NewCredentialLeak,
};
use super::CREDENTIAL_LEAKS;

// ============================================================================
// Credential Leak Service
// ============================================================================
//
// CRUD over the subject table, with one audit entry per successful
// mutation. Delete ordering matters: the subject row is removed first and
// the DELETE entry is appended after, so a failed delete can never leave a
// false DELETE record behind. An audit append failing after the mutation
// succeeded is logged and swallowed; the mutation is already durable.
//
// ============================================================================

pub struct CredentialLeakService {
    store: Arc<dyn StoreClient>,
    audit: CredentialLeakAudit,
}

impl CredentialLeakService {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        let audit = CredentialLeakAudit::new(store.clone());
        Self { store, audit }
    }

    /// The recorder behind this service, for log queries.
    pub fn audit(&self) -> &CredentialLeakAudit {
        &self.audit
    }

    /// All leak records, most recently notified first.
    pub async fn fetch_all(&self) -> Result<Vec<CredentialLeak>, CredentialLeakError> {
        let rows = self.store.select(CREDENTIAL_LEAKS, RowFilter::new()).await?;
        let mut leaks = rows
            .into_iter()
            .map(|row| decode::<CredentialLeakRow>(CREDENTIAL_LEAKS, row))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(CredentialLeak::from)
            .collect::<Vec<_>>();
        leaks.sort_by(|a, b| b.notification_date.cmp(&a.notification_date));
        Ok(leaks)
    }

    pub async fn fetch_one(&self, id: Uuid) -> Result<Option<CredentialLeak>, CredentialLeakError> {
        match self
            .store
            .select_one(CREDENTIAL_LEAKS, RowFilter::new().eq("id", id.to_string()))
            .await
        {
            Ok(row) => Ok(Some(
                decode::<CredentialLeakRow>(CREDENTIAL_LEAKS, row)?.into(),
            )),
            Err(err) if err.is_no_rows() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn create(
        &self,
        input: &NewCredentialLeak,
    ) -> Result<CredentialLeak, CredentialLeakError> {
        let row = encode(CREDENTIAL_LEAKS, input)?;
        let inserted = self
            .store
            .insert(CREDENTIAL_LEAKS, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no rows".to_string()))?;
        let leak: CredentialLeak = decode::<CredentialLeakRow>(CREDENTIAL_LEAKS, inserted)?.into();

        if let Err(err) = self.audit.record_created(&leak).await {
            tracing::warn!(leak_id = %leak.id, error = %err,
                "leak created but the audit entry was not recorded");
        }
        Ok(leak)
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: &CredentialLeakPatch,
    ) -> Result<CredentialLeak, CredentialLeakError> {
        let old = self
            .fetch_one(id)
            .await?
            .ok_or(CredentialLeakError::NotFound(id))?;

        let patch_row = encode(CREDENTIAL_LEAKS, patch)?;
        let updated = self
            .store
            .update(
                CREDENTIAL_LEAKS,
                patch_row,
                RowFilter::new().eq("id", id.to_string()),
            )
            .await?
            .into_iter()
            .next()
            .ok_or(CredentialLeakError::NotFound(id))?;
        let new: CredentialLeak = decode::<CredentialLeakRow>(CREDENTIAL_LEAKS, updated)?.into();

        if let Err(err) = self.audit.record_updated(&old, &new).await {
            tracing::warn!(leak_id = %id, error = %err,
                "leak updated but the audit entry was not recorded");
        }
        Ok(new)
    }

    /// Delete the subject row, then append the DELETE audit entry pointing
    /// at the now-nonexistent row. A failed append does not undo or fail
    /// the delete.
    pub async fn delete(&self, id: Uuid) -> Result<(), CredentialLeakError> {
        let old = self
            .fetch_one(id)
            .await?
            .ok_or(CredentialLeakError::NotFound(id))?;

        self.store
            .delete(CREDENTIAL_LEAKS, RowFilter::new().eq("id", id.to_string()))
            .await?;
        tracing::info!(leak_id = %id, "credential leak deleted");

        if let Err(err) = self.audit.record_deleted(&old).await {
            tracing::warn!(leak_id = %id, error = %err,
                "delete succeeded but the audit entry was not recorded");
        }
        Ok(())
    }
}
