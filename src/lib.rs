//! Persistence and audit layer for a security-incident tracker.
//!
//! The tracker's data lives in a remote relational store reachable only
//! through equality-filtered, single-table calls (no joins, no
//! transactions). This crate owns everything between that store and the
//! presentation layer:
//!
//! - reconstructing incident aggregates from a parent row plus three child
//!   tables ([`domain::incident::IncidentReader`])
//! - writing them back across multiple non-transactional calls, tolerating
//!   partial child failures ([`domain::incident::IncidentWriter`])
//! - deleting them in dependency-safe order
//!   ([`domain::incident::IncidentDeleter`])
//! - keeping an append-only audit trail for credential-leak records that
//!   stays queryable after the record is gone
//!   ([`domain::credential_leak::CredentialLeakAudit`])
//! - filtering the resulting in-memory collections
//!   ([`filter::IncidentFilter`], [`filter::LeakFilter`])

pub mod domain;
pub mod filter;
pub mod store;

pub use domain::credential_leak::{
    AuditAction, CredentialLeak, CredentialLeakAudit, CredentialLeakAuditEntry,
    CredentialLeakError, CredentialLeakPatch, CredentialLeakService, NewCredentialLeak,
};
pub use domain::incident::{
    AssignedUser, CustomIncidentType, CustomTypeCatalog, Incident, IncidentDeleter, IncidentError,
    IncidentReader, IncidentSeverity, IncidentStatus, IncidentWriter, NewIncident, TimelineEvent,
};
pub use filter::{IncidentFilter, LeakFilter};
pub use store::{MemoryStore, RowFilter, StoreClient, StoreError, TableDef};
