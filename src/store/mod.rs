// ============================================================================
// Store Boundary
// ============================================================================
//
// Everything the data layer knows about the remote store: the client
// contract, its error taxonomy, and the in-memory backend used by tests
// and the demo binary.
//
// ============================================================================

pub mod client;
pub mod error;
pub mod memory;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{from_row, to_row, Row, RowFilter, StoreClient};
pub use error::StoreError;
pub use memory::{MemoryStore, TableDef};
