use std::sync::Arc;

use uuid::Uuid;

use crate::store::{RowFilter, StoreClient, StoreError};

use super::errors::IncidentError;
use super::model::{decode, encode, CustomIncidentType, CustomIncidentTypeRow, NewCustomIncidentTypeRow};
use super::CUSTOM_INCIDENT_TYPES;

// ============================================================================
// Custom Incident Type Catalog
// ============================================================================
//
// User-defined extensions of the built-in incident type set. Flat rows,
// no children, no aggregate machinery.
//
// ============================================================================

pub struct CustomTypeCatalog {
    store: Arc<dyn StoreClient>,
}

impl CustomTypeCatalog {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self { store }
    }

    /// All custom types, newest first.
    pub async fn fetch_all(&self) -> Result<Vec<CustomIncidentType>, IncidentError> {
        let rows = self
            .store
            .select(CUSTOM_INCIDENT_TYPES, RowFilter::new())
            .await?;
        let mut types = rows
            .into_iter()
            .map(|row| decode::<CustomIncidentTypeRow>(CUSTOM_INCIDENT_TYPES, row))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(CustomIncidentType::from)
            .collect::<Vec<_>>();
        types.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(types)
    }

    /// Create a custom type, rejecting names that already exist.
    pub async fn create(&self, name: &str) -> Result<CustomIncidentType, IncidentError> {
        match self
            .store
            .select_one(CUSTOM_INCIDENT_TYPES, RowFilter::new().eq("name", name))
            .await
        {
            Ok(_) => return Err(IncidentError::DuplicateType(name.to_string())),
            Err(err) if err.is_no_rows() => {}
            Err(err) => return Err(err.into()),
        }

        let row = encode(CUSTOM_INCIDENT_TYPES, &NewCustomIncidentTypeRow { name })?;
        let inserted = self
            .store
            .insert(CUSTOM_INCIDENT_TYPES, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no rows".to_string()))?;
        let created: CustomIncidentTypeRow = decode(CUSTOM_INCIDENT_TYPES, inserted)?;
        Ok(created.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), IncidentError> {
        self.store
            .delete(
                CUSTOM_INCIDENT_TYPES,
                RowFilter::new().eq("id", id.to_string()),
            )
            .await?;
        Ok(())
    }
}
