use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use shared_store::{CareStore, Caregiver, NewCaregiver};

use crate::models::{CaregiverError, CreateCaregiverRequest, UpdateCaregiverRequest};

pub struct CaregiverService {
    store: Arc<dyn CareStore>,
}

impl CaregiverService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    pub async fn create_caregiver(
        &self,
        request: CreateCaregiverRequest,
    ) -> Result<Caregiver, CaregiverError> {
        let name = validate_name(request.name)?;

        let caregiver = self
            .store
            .insert_caregiver(NewCaregiver {
                user_id: None,
                name,
                specialization: request.specialization,
                availability: request.availability.unwrap_or(true),
            })
            .await?;

        info!("Created caregiver {}", caregiver.id);
        Ok(caregiver)
    }

    pub async fn get_caregiver(&self, id: Uuid) -> Result<Caregiver, CaregiverError> {
        self.store
            .caregiver(id)
            .await?
            .ok_or(CaregiverError::NotFound)
    }

    pub async fn list_caregivers(&self) -> Result<Vec<Caregiver>, CaregiverError> {
        Ok(self.store.caregivers().await?)
    }

    pub async fn update_caregiver(
        &self,
        id: Uuid,
        request: UpdateCaregiverRequest,
    ) -> Result<Caregiver, CaregiverError> {
        let mut caregiver = self
            .store
            .caregiver(id)
            .await?
            .ok_or(CaregiverError::NotFound)?;

        if let Some(name) = request.name {
            caregiver.name = validate_name(Some(name))?;
        }
        if let Some(specialization) = request.specialization {
            caregiver.specialization = Some(specialization);
        }
        if let Some(availability) = request.availability {
            caregiver.availability = availability;
        }

        self.store.update_caregiver(caregiver.clone()).await?;
        Ok(caregiver)
    }

    /// Removes the caregiver together with their assignments, appointments
    /// and schedule slots.
    pub async fn delete_caregiver(&self, id: Uuid) -> Result<(), CaregiverError> {
        if !self.store.delete_caregiver(id).await? {
            return Err(CaregiverError::NotFound);
        }
        info!("Deleted caregiver {}", id);
        Ok(())
    }
}

fn validate_name(name: Option<String>) -> Result<String, CaregiverError> {
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CaregiverError::InvalidArgument("Caregiver name is required".to_string()))?;

    if name.chars().count() < 2 {
        return Err(CaregiverError::InvalidArgument(
            "Caregiver name must be at least 2 characters".to_string(),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_store::MemoryStore;

    fn service() -> CaregiverService {
        CaregiverService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn availability_defaults_on_and_can_be_toggled() {
        let service = service();
        let created = service
            .create_caregiver(CreateCaregiverRequest {
                name: Some("Niamh Byrne".to_string()),
                specialization: Some("Elder care".to_string()),
                availability: None,
            })
            .await
            .unwrap();
        assert!(created.availability);

        let updated = service
            .update_caregiver(
                created.id,
                UpdateCaregiverRequest {
                    name: None,
                    specialization: None,
                    availability: Some(false),
                },
            )
            .await
            .unwrap();
        assert!(!updated.availability);
        assert_eq!(updated.name, "Niamh Byrne");
    }

    #[tokio::test]
    async fn name_is_validated_on_create_and_update() {
        let service = service();
        assert_matches!(
            service
                .create_caregiver(CreateCaregiverRequest {
                    name: Some(" ".to_string()),
                    specialization: None,
                    availability: None,
                })
                .await,
            Err(CaregiverError::InvalidArgument(_))
        );
    }

    #[tokio::test]
    async fn missing_caregiver_is_not_found() {
        let service = service();
        assert_matches!(
            service.get_caregiver(Uuid::new_v4()).await,
            Err(CaregiverError::NotFound)
        );
        assert_matches!(
            service.delete_caregiver(Uuid::new_v4()).await,
            Err(CaregiverError::NotFound)
        );
    }
}
