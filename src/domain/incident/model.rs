use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Incident Domain Model
// ============================================================================
//
// The incident aggregate: one parent row plus three child collections,
// reconstructed from four tables. Row structs at the bottom carry the
// store-side column names; the domain types above them carry the shape the
// rest of the application works with.
//
// ============================================================================

/// Built-in incident types; the `kind` field is an open string so
/// user-defined types extend this set.
pub const KNOWN_INCIDENT_TYPES: [&str; 6] = [
    "malware",
    "phishing",
    "unauthorized-access",
    "data-breach",
    "ddos",
    "other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentSeverity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Open,
    Investigating,
    Resolved,
    Closed,
}

/// At most one per incident, by business rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedUser {
    pub name: String,
    pub initials: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub time: DateTime<Utc>,
    pub event: String,
}

/// The full aggregate as observed by readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub kind: String,
    pub additional_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_user: Option<AssignedUser>,
    pub affected_systems: Vec<String>,
    pub timeline: Vec<TimelineEvent>,
}

/// Creation input: the aggregate without identity or timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub kind: String,
    pub additional_details: Option<String>,
    pub assigned_user: Option<AssignedUser>,
    pub affected_systems: Vec<String>,
    pub timeline: Vec<TimelineEvent>,
}

/// A user-defined extension of the incident type set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomIncidentType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Row types - the store-side shape of the aggregate
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IncidentRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub additional_details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The parent's scalar columns, written on create and patched on update;
/// children travel through their own tables.
#[derive(Debug, Serialize)]
pub(crate) struct IncidentScalarsRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    #[serde(rename = "type")]
    pub kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_details: Option<&'a str>,
}

impl<'a> From<&'a NewIncident> for IncidentScalarsRow<'a> {
    fn from(input: &'a NewIncident) -> Self {
        Self {
            title: &input.title,
            description: &input.description,
            severity: input.severity,
            status: input.status,
            kind: &input.kind,
            additional_details: input.additional_details.as_deref(),
        }
    }
}

impl<'a> From<&'a Incident> for IncidentScalarsRow<'a> {
    fn from(incident: &'a Incident) -> Self {
        Self {
            title: &incident.title,
            description: &incident.description,
            severity: incident.severity,
            status: incident.status,
            kind: &incident.kind,
            additional_details: incident.additional_details.as_deref(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssignedUserRow {
    pub incident_id: Uuid,
    pub name: String,
    pub initials: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AffectedSystemRow {
    pub incident_id: Uuid,
    pub system_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TimelineEventRow {
    pub incident_id: Uuid,
    pub event: String,
    pub time: DateTime<Utc>,
}

/// Reconstruct the aggregate from its parent row and child rows.
pub(crate) fn assemble(
    parent: IncidentRow,
    assigned: Option<AssignedUserRow>,
    systems: Vec<AffectedSystemRow>,
    mut timeline: Vec<TimelineEventRow>,
) -> Incident {
    timeline.sort_by_key(|event| event.time);
    Incident {
        id: parent.id,
        title: parent.title,
        description: parent.description,
        severity: parent.severity,
        status: parent.status,
        kind: parent.kind,
        additional_details: parent.additional_details,
        created_at: parent.created_at,
        updated_at: parent.updated_at,
        assigned_user: assigned.map(|row| AssignedUser {
            name: row.name,
            initials: row.initials,
        }),
        affected_systems: systems.into_iter().map(|row| row.system_name).collect(),
        timeline: timeline
            .into_iter()
            .map(|row| TimelineEvent {
                time: row.time,
                event: row.event,
            })
            .collect(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CustomIncidentTypeRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CustomIncidentTypeRow> for CustomIncidentType {
    fn from(row: CustomIncidentTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewCustomIncidentTypeRow<'a> {
    pub name: &'a str,
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    table: &'static str,
    row: crate::store::Row,
) -> Result<T, super::IncidentError> {
    crate::store::from_row(row).map_err(|source| super::IncidentError::InvalidRow { table, source })
}

pub(crate) fn encode<T: Serialize>(
    table: &'static str,
    value: &T,
) -> Result<crate::store::Row, super::IncidentError> {
    crate::store::to_row(value).map_err(|source| super::IncidentError::InvalidRow { table, source })
}
