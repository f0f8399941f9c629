use crate::domain::credential_leak::CredentialLeak;
use crate::domain::incident::{Incident, IncidentSeverity, IncidentStatus};

// ============================================================================
// Filter Engine
// ============================================================================
//
// Pure, synchronous conjunctive filters over the in-memory collections.
// Every predicate defaults to "no constraint" and active predicates
// compose with AND. Recomputation is a total O(n) pass; collections top
// out in the low hundreds, so no index is kept. Input order is preserved.
//
// ============================================================================

/// Incident filter: a quick status tab, explicit status/severity/type
/// values, and a free-text query over title and description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentFilter {
    pub tab: Option<IncidentStatus>,
    pub status: Option<IncidentStatus>,
    pub severity: Option<IncidentSeverity>,
    pub kind: Option<String>,
    pub query: String,
}

impl IncidentFilter {
    pub fn matches(&self, incident: &Incident) -> bool {
        if let Some(tab) = self.tab {
            if incident.status != tab {
                return false;
            }
        }
        if let Some(status) = self.status {
            if incident.status != status {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if incident.severity != severity {
                return false;
            }
        }
        if let Some(kind) = &self.kind {
            if incident.kind != *kind {
                return false;
            }
        }
        if !self.query.is_empty() {
            let query = self.query.to_lowercase();
            if !incident.title.to_lowercase().contains(&query)
                && !incident.description.to_lowercase().contains(&query)
            {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, incidents: &[Incident]) -> Vec<Incident> {
        incidents
            .iter()
            .filter(|incident| self.matches(incident))
            .cloned()
            .collect()
    }
}

/// Leak filter: a free-text query over email, username, notification
/// source, and the partial password. A blank query matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeakFilter {
    pub query: String,
}

impl LeakFilter {
    pub fn matches(&self, leak: &CredentialLeak) -> bool {
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        leak.email.to_lowercase().contains(&query)
            || leak.username.to_lowercase().contains(&query)
            || leak.notification_source.to_lowercase().contains(&query)
            || leak
                .partial_password
                .as_ref()
                .is_some_and(|password| password.to_lowercase().contains(&query))
    }

    pub fn apply(&self, leaks: &[CredentialLeak]) -> Vec<CredentialLeak> {
        leaks.iter().filter(|leak| self.matches(leak)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn incident(title: &str, severity: IncidentSeverity, status: IncidentStatus) -> Incident {
        Incident {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{title} description"),
            severity,
            status,
            kind: "other".to_string(),
            additional_details: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assigned_user: None,
            affected_systems: Vec::new(),
            timeline: Vec::new(),
        }
    }

    fn sample() -> Vec<Incident> {
        vec![
            incident(
                "DDoS on public API",
                IncidentSeverity::Critical,
                IncidentStatus::Open,
            ),
            incident(
                "Phishing wave",
                IncidentSeverity::High,
                IncidentStatus::Investigating,
            ),
            incident(
                "Stale admin account",
                IncidentSeverity::Low,
                IncidentStatus::Open,
            ),
        ]
    }

    #[test]
    fn unconstrained_filter_is_the_identity() {
        let incidents = sample();
        let filtered = IncidentFilter::default().apply(&incidents);
        assert_eq!(filtered, incidents);
    }

    #[test]
    fn predicates_compose_with_and() {
        let incidents = sample();
        let filtered = IncidentFilter {
            status: Some(IncidentStatus::Open),
            severity: Some(IncidentSeverity::Critical),
            ..Default::default()
        }
        .apply(&incidents);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "DDoS on public API");
    }

    #[test]
    fn predicate_order_does_not_matter() {
        let incidents = sample();

        let by_status = IncidentFilter {
            status: Some(IncidentStatus::Open),
            ..Default::default()
        };
        let by_severity = IncidentFilter {
            severity: Some(IncidentSeverity::Low),
            ..Default::default()
        };

        let status_then_severity = by_severity.apply(&by_status.apply(&incidents));
        let severity_then_status = by_status.apply(&by_severity.apply(&incidents));
        assert_eq!(status_then_severity, severity_then_status);
    }

    #[test]
    fn tab_is_a_status_shortcut_that_still_ands() {
        let incidents = sample();
        let filtered = IncidentFilter {
            tab: Some(IncidentStatus::Open),
            status: Some(IncidentStatus::Investigating),
            ..Default::default()
        }
        .apply(&incidents);

        // Tab and status disagree; the conjunction is empty.
        assert!(filtered.is_empty());
    }

    #[test]
    fn query_is_case_insensitive_over_title_and_description() {
        let incidents = sample();

        let by_title = IncidentFilter {
            query: "ddos".to_string(),
            ..Default::default()
        }
        .apply(&incidents);
        assert_eq!(by_title.len(), 1);

        let by_description = IncidentFilter {
            query: "WAVE DESCRIPTION".to_string(),
            ..Default::default()
        }
        .apply(&incidents);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].title, "Phishing wave");
    }

    fn leak(email: &str, username: &str, source: &str, partial: Option<&str>) -> CredentialLeak {
        CredentialLeak {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            notification_date: Utc::now(),
            notification_source: source.to_string(),
            action_taken: None,
            partial_password: partial.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn blank_leak_query_matches_everything() {
        let leaks = vec![
            leak("ana@example.com", "ana", "haveibeenpwned", None),
            leak("bruno@example.com", "bruno", "vendor-report", Some("pa**")),
        ];
        let filtered = LeakFilter {
            query: "   ".to_string(),
        }
        .apply(&leaks);
        assert_eq!(filtered, leaks);
    }

    #[test]
    fn leak_query_scans_all_text_fields() {
        let leaks = vec![
            leak("ana@example.com", "ana", "haveibeenpwned", None),
            leak("bruno@example.com", "bruno", "vendor-report", Some("pa**")),
        ];

        for (query, expected_email) in [
            ("BRUNO@", "bruno@example.com"),
            ("haveibeen", "ana@example.com"),
            ("pa**", "bruno@example.com"),
        ] {
            let filtered = LeakFilter {
                query: query.to_string(),
            }
            .apply(&leaks);
            assert_eq!(filtered.len(), 1, "query {query:?}");
            assert_eq!(filtered[0].email, expected_email);
        }
    }
}
