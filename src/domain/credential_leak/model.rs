use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Credential Leak Domain Model
// ============================================================================
//
// A flat, independently-mutable record. Every mutation leaves one entry in
// the audit log; the log keys entries by the subject's id without an
// enforced reference, so they stay queryable after the subject is gone.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialLeak {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub notification_date: DateTime<Utc>,
    pub notification_source: String,
    pub action_taken: Option<String>,
    pub partial_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation input; identity and timestamps come from the store. Field
/// names match the store columns, so this serializes straight into a row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCredentialLeak {
    pub email: String,
    pub username: String,
    pub notification_date: DateTime<Utc>,
    pub notification_source: String,
    pub action_taken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_password: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CredentialLeakPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

/// One append-only log entry. `subject_id` is a lookup key, not an
/// enforced reference: the subject may no longer exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialLeakAuditEntry {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub action: AuditAction,
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub actor_id: Option<Uuid>,
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CredentialLeakRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub notification_date: DateTime<Utc>,
    pub notification_source: String,
    #[serde(default)]
    pub action_taken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CredentialLeakRow> for CredentialLeak {
    fn from(row: CredentialLeakRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            notification_date: row.notification_date,
            notification_source: row.notification_source,
            action_taken: row.action_taken,
            partial_password: row.partial_password,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<&CredentialLeak> for CredentialLeakRow {
    fn from(leak: &CredentialLeak) -> Self {
        Self {
            id: leak.id,
            email: leak.email.clone(),
            username: leak.username.clone(),
            notification_date: leak.notification_date,
            notification_source: leak.notification_source.clone(),
            action_taken: leak.action_taken.clone(),
            partial_password: leak.partial_password.clone(),
            created_at: leak.created_at,
            updated_at: leak.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AuditEntryRow {
    pub id: Uuid,
    pub credential_leak_id: Uuid,
    pub action: AuditAction,
    pub details: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl From<AuditEntryRow> for CredentialLeakAuditEntry {
    fn from(row: AuditEntryRow) -> Self {
        Self {
            id: row.id,
            subject_id: row.credential_leak_id,
            action: row.action,
            details: row.details,
            created_at: row.created_at,
            actor_id: row.user_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewAuditEntryRow {
    pub credential_leak_id: Uuid,
    pub action: AuditAction,
    pub details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    table: &'static str,
    row: crate::store::Row,
) -> Result<T, super::CredentialLeakError> {
    crate::store::from_row(row)
        .map_err(|source| super::CredentialLeakError::InvalidRow { table, source })
}

pub(crate) fn encode<T: Serialize>(
    table: &'static str,
    value: &T,
) -> Result<crate::store::Row, super::CredentialLeakError> {
    crate::store::to_row(value)
        .map_err(|source| super::CredentialLeakError::InvalidRow { table, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn audit_action_uses_uppercase_wire_names() {
        assert_eq!(
            serde_json::to_value(AuditAction::Delete).unwrap(),
            json!("DELETE")
        );
        let back: AuditAction = serde_json::from_value(json!("CREATE")).unwrap();
        assert_eq!(back, AuditAction::Create);
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = CredentialLeakPatch {
            action_taken: Some("password rotated".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object.get("action_taken"), Some(&json!("password rotated")));
    }
}
