use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use shared_store::{CareStore, NewPatient, Patient};

use crate::models::{CreatePatientRequest, PatientDetail, PatientError, UpdatePatientRequest};

pub struct PatientService {
    store: Arc<dyn CareStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let name = validate_name(request.name)?;

        let patient = self
            .store
            .insert_patient(NewPatient {
                user_id: None,
                name,
                address: request.address,
                medical_record: request.medical_record,
            })
            .await?;

        info!("Created patient {}", patient.id);
        Ok(patient)
    }

    /// Patient row plus their currently assigned caregiver, resolved through
    /// the active assignment.
    pub async fn get_patient(&self, id: Uuid) -> Result<PatientDetail, PatientError> {
        let patient = self.store.patient(id).await?.ok_or(PatientError::NotFound)?;

        let assigned_caregiver = match self.store.active_assignment_for_patient(id).await? {
            Some(assignment) => self.store.caregiver(assignment.caregiver_id).await?,
            None => None,
        };

        Ok(PatientDetail {
            patient,
            assigned_caregiver,
        })
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        Ok(self.store.patients().await?)
    }

    pub async fn update_patient(
        &self,
        id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        let mut patient = self.store.patient(id).await?.ok_or(PatientError::NotFound)?;

        if let Some(name) = request.name {
            patient.name = validate_name(Some(name))?;
        }
        if let Some(address) = request.address {
            patient.address = Some(address);
        }
        if let Some(medical_record) = request.medical_record {
            patient.medical_record = Some(medical_record);
        }

        self.store.update_patient(patient.clone()).await?;
        Ok(patient)
    }

    /// Removes the patient together with their assignments and appointments.
    pub async fn delete_patient(&self, id: Uuid) -> Result<(), PatientError> {
        if !self.store.delete_patient(id).await? {
            return Err(PatientError::NotFound);
        }
        info!("Deleted patient {}", id);
        Ok(())
    }
}

fn validate_name(name: Option<String>) -> Result<String, PatientError> {
    let name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| PatientError::InvalidArgument("Patient name is required".to_string()))?;

    if name.chars().count() < 2 {
        return Err(PatientError::InvalidArgument(
            "Patient name must be at least 2 characters".to_string(),
        ));
    }
    Ok(name)
}
