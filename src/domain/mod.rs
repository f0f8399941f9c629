// ============================================================================
// Domain Layer
// ============================================================================
//
// Each entity keeps its model, persistence orchestration, and errors in its
// own module.
//
// ============================================================================

pub mod credential_leak;
pub mod incident;

use crate::store::TableDef;

/// Table definitions mirroring the tracker's remote schema, for the
/// in-memory backend. Child tables reference their incident; the audit log
/// deliberately declares no reference so its entries outlive the leak
/// record they describe.
pub fn schema() -> Vec<TableDef> {
    vec![
        TableDef::new(incident::INCIDENTS)
            .with_created_at()
            .with_updated_at(),
        TableDef::new(incident::ASSIGNED_USERS).with_reference("incident_id", incident::INCIDENTS),
        TableDef::new(incident::AFFECTED_SYSTEMS)
            .with_reference("incident_id", incident::INCIDENTS),
        TableDef::new(incident::TIMELINE_EVENTS).with_reference("incident_id", incident::INCIDENTS),
        TableDef::new(incident::CUSTOM_INCIDENT_TYPES).with_created_at(),
        TableDef::new(credential_leak::CREDENTIAL_LEAKS)
            .with_created_at()
            .with_updated_at(),
        TableDef::new(credential_leak::CREDENTIAL_LEAK_LOGS).with_created_at(),
    ]
}
