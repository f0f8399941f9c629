use uuid::Uuid;

use crate::store::StoreError;

// ============================================================================
// Incident Data-Layer Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IncidentError {
    /// The remote store rejected or failed a call; surfaced unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("`{table}` row did not match the expected shape: {source}")]
    InvalidRow {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A write reported success but the aggregate could not be read back.
    #[error("incident {0} could not be read back after a successful write")]
    MissingAfterWrite(Uuid),

    #[error("incident type `{0}` already exists")]
    DuplicateType(String),
}
