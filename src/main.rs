use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use incident_ledger::{
    domain, AssignedUser, CredentialLeakPatch, CredentialLeakService, CustomTypeCatalog,
    IncidentDeleter, IncidentFilter, IncidentReader, IncidentSeverity, IncidentStatus,
    IncidentWriter, MemoryStore, NewCredentialLeak, NewIncident, StoreClient, TimelineEvent,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,incident_ledger=debug")),
        )
        .init();

    tracing::info!("🚀 Starting incident ledger demo");

    // === 1. Stand up the in-memory store with the tracker schema ===
    let store: Arc<dyn StoreClient> = Arc::new(MemoryStore::new(domain::schema()));

    let reader = IncidentReader::new(store.clone());
    let writer = IncidentWriter::new(store.clone());
    let deleter = IncidentDeleter::new(store.clone());
    let types = CustomTypeCatalog::new(store.clone());
    let leaks = CredentialLeakService::new(store.clone());

    // === 2. Incident lifecycle ===
    let incident = writer
        .create(&NewIncident {
            title: "DDoS on public API".to_string(),
            description: "Volumetric attack saturating the edge".to_string(),
            severity: IncidentSeverity::Critical,
            status: IncidentStatus::Open,
            kind: "ddos".to_string(),
            additional_details: None,
            assigned_user: None,
            affected_systems: vec!["api-gateway".to_string()],
            timeline: Vec::new(),
        })
        .await?;
    tracing::info!(id = %incident.id, "✅ Incident created");

    let mut assigned = incident.clone();
    assigned.assigned_user = Some(AssignedUser {
        name: "Ana".to_string(),
        initials: "A".to_string(),
    });
    assigned.status = IncidentStatus::Investigating;
    let assigned = writer.update(&assigned).await?;
    tracing::info!(
        assignee = assigned.assigned_user.as_ref().map(|u| u.name.as_str()).unwrap_or("-"),
        "✅ Incident assigned"
    );

    let mut reassigned = assigned.clone();
    reassigned.assigned_user = Some(AssignedUser {
        name: "Bruno".to_string(),
        initials: "B".to_string(),
    });
    let reassigned = writer.update(&reassigned).await?;
    tracing::info!(
        assignee = reassigned.assigned_user.as_ref().map(|u| u.name.as_str()).unwrap_or("-"),
        "✅ Incident reassigned"
    );

    writer
        .append_timeline_event(
            incident.id,
            &TimelineEvent {
                time: Utc::now(),
                event: "Mitigation rules pushed to the edge".to_string(),
            },
        )
        .await?;

    let custom = types.create("botnet-c2").await?;
    tracing::info!(name = %custom.name, "✅ Custom incident type registered");

    let investigating = IncidentFilter {
        tab: Some(IncidentStatus::Investigating),
        ..Default::default()
    }
    .apply(&reader.fetch_all().await?);
    tracing::info!(count = investigating.len(), "🔎 Incidents under investigation");

    deleter.delete(incident.id).await?;
    tracing::info!(id = %incident.id, "✅ Incident deleted");

    // === 3. Credential leak lifecycle with audit trail ===
    let leak = leaks
        .create(&NewCredentialLeak {
            email: "ana@example.com".to_string(),
            username: "ana".to_string(),
            notification_date: Utc::now(),
            notification_source: "haveibeenpwned".to_string(),
            action_taken: None,
            partial_password: Some("pa**".to_string()),
        })
        .await?;
    tracing::info!(id = %leak.id, "✅ Credential leak recorded");

    leaks
        .update(
            leak.id,
            &CredentialLeakPatch {
                action_taken: Some("password rotated".to_string()),
                ..Default::default()
            },
        )
        .await?;
    tracing::info!(id = %leak.id, "✅ Credential leak updated");

    leaks.delete(leak.id).await?;
    tracing::info!(id = %leak.id, "✅ Credential leak deleted");

    // The trail survives the record it describes.
    let trail = leaks.audit().fetch_logs(leak.id).await?;
    for entry in &trail {
        tracing::info!(action = ?entry.action, at = %entry.created_at, "📜 Audit entry");
    }

    tracing::info!("🎉 Demo complete");
    Ok(())
}
