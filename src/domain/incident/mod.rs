// ============================================================================
// Incident Domain - the aggregate and its persistence orchestration
// ============================================================================
//
// This module contains ALL incident-specific code:
// - Domain model and row mapping (model)
// - Aggregate reader, writer, deleter
// - Custom incident type catalog
// - Data-layer errors
//
// ============================================================================

pub mod custom_types;
pub mod deleter;
pub mod errors;
pub mod model;
pub mod reader;
pub mod writer;

pub use custom_types::CustomTypeCatalog;
pub use deleter::IncidentDeleter;
pub use errors::IncidentError;
pub use model::{
    AssignedUser, CustomIncidentType, Incident, IncidentSeverity, IncidentStatus, NewIncident,
    TimelineEvent, KNOWN_INCIDENT_TYPES,
};
pub use reader::IncidentReader;
pub use writer::IncidentWriter;

// Logical table names in the remote store.
pub const INCIDENTS: &str = "incidents";
pub const ASSIGNED_USERS: &str = "assigned_users";
pub const AFFECTED_SYSTEMS: &str = "affected_systems";
pub const TIMELINE_EVENTS: &str = "timeline_events";
pub const CUSTOM_INCIDENT_TYPES: &str = "custom_incident_types";
