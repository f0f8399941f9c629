// ============================================================================
// Store Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A single-row fetch matched nothing. Readers translate this into an
    /// absent value instead of surfacing it.
    #[error("no rows matched on `{table}`")]
    NoRows { table: String },

    /// A single-row fetch matched more than one row.
    #[error("multiple rows matched a single-row fetch on `{table}`")]
    MultipleRows { table: String },

    #[error("unknown table `{0}`")]
    UnknownTable(String),

    /// A row references a parent that does not exist.
    #[error("row in `{table}` references a missing parent in `{references}`")]
    ForeignKey { table: String, references: String },

    /// Rows cannot be deleted while child rows still reference them.
    #[error("rows in `{table}` are still referenced from `{referenced_by}`")]
    Restricted {
        table: String,
        referenced_by: String,
    },

    /// Any other remote-store failure.
    #[error("remote store failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// The distinguished "no matching row" condition of single-row fetches.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows { .. })
    }
}
