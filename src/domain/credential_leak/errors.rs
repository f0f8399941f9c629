use uuid::Uuid;

use crate::store::StoreError;

// ============================================================================
// Credential Leak Data-Layer Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CredentialLeakError {
    /// The remote store rejected or failed a call; surfaced unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("`{table}` row did not match the expected shape: {source}")]
    InvalidRow {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The record to mutate does not exist.
    #[error("credential leak {0} not found")]
    NotFound(Uuid),
}
