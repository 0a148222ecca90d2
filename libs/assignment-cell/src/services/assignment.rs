use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use shared_models::lifecycle::{apply_status, AssignmentStatus, StatusLifecycle};
use shared_store::{Assignment, CareStore, NewAssignment};

use crate::models::{
    AssignmentCandidates, AssignmentError, AssignmentView, AvailableCaregiver,
    CreateAssignmentRequest, RecentAssignments, UpdateAssignmentStatusRequest,
};

pub struct AssignmentService {
    store: Arc<dyn CareStore>,
    // Serializes the duplicate-active check against the insert.
    creation_gate: Mutex<()>,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self {
            store,
            creation_gate: Mutex::new(()),
        }
    }

    /// At most one active assignment per patient. The check and the insert
    /// run under the creation gate so two concurrent requests cannot both
    /// pass the check.
    pub async fn create_assignment(
        &self,
        request: CreateAssignmentRequest,
    ) -> Result<Assignment, AssignmentError> {
        let patient_id = request.patient_id.ok_or_else(|| {
            AssignmentError::InvalidArgument("patient_id is required".to_string())
        })?;
        let caregiver_id = request.caregiver_id.ok_or_else(|| {
            AssignmentError::InvalidArgument("caregiver_id is required".to_string())
        })?;

        self.store
            .patient(patient_id)
            .await?
            .ok_or(AssignmentError::PatientNotFound)?;
        self.store
            .caregiver(caregiver_id)
            .await?
            .ok_or(AssignmentError::CaregiverNotFound)?;

        let _guard = self.creation_gate.lock().await;

        if self
            .store
            .active_assignment_for_patient(patient_id)
            .await?
            .is_some()
        {
            return Err(AssignmentError::DuplicateActive);
        }

        let assignment = self
            .store
            .insert_assignment(NewAssignment {
                patient_id,
                caregiver_id,
                start_date: request
                    .start_date
                    .unwrap_or_else(|| Utc::now().date_naive()),
                notes: request.notes,
            })
            .await?;

        info!(
            "Assigned patient {} to caregiver {} ({})",
            patient_id, caregiver_id, assignment.id
        );
        Ok(assignment)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateAssignmentStatusRequest,
    ) -> Result<Assignment, AssignmentError> {
        let requested = request
            .status
            .ok_or_else(|| AssignmentError::InvalidArgument("status is required".to_string()))?
            .parse::<AssignmentStatus>()
            .map_err(AssignmentError::InvalidArgument)?;

        let mut assignment = self
            .store
            .assignment(id)
            .await?
            .ok_or(AssignmentError::NotFound)?;

        assignment.status = apply_status(assignment.status, requested)?;
        if let Some(notes) = request.notes {
            assignment.notes = Some(notes);
        }
        if assignment.status.is_terminal() && assignment.end_date.is_none() {
            assignment.end_date = Some(Utc::now().date_naive());
        }
        assignment.updated_at = Utc::now();

        self.store.update_assignment(assignment.clone()).await?;
        info!("Assignment {} is now {}", id, assignment.status);
        Ok(assignment)
    }

    /// Active assignments joined with display names. A caregiver id narrows
    /// the listing to that caregiver's patients.
    pub async fn list_active(
        &self,
        caregiver_id: Option<Uuid>,
    ) -> Result<Vec<AssignmentView>, AssignmentError> {
        let mut assignments = self.store.assignments().await?;
        assignments.retain(|a| a.status == AssignmentStatus::Active);
        if let Some(caregiver_id) = caregiver_id {
            assignments.retain(|a| a.caregiver_id == caregiver_id);
        }
        self.join_names(assignments).await
    }

    /// Caregivers accepting new assignments with their active load, plus
    /// patients with no active assignment.
    pub async fn candidates(&self) -> Result<AssignmentCandidates, AssignmentError> {
        let caregivers = self.store.caregivers().await?;
        let mut available = Vec::new();
        for caregiver in caregivers.into_iter().filter(|c| c.availability) {
            let active_patients = self
                .store
                .active_assignments_for_caregiver(caregiver.id)
                .await?
                .len();
            available.push(AvailableCaregiver {
                caregiver,
                active_patients,
            });
        }

        Ok(AssignmentCandidates {
            caregivers: available,
            unassigned_patients: self.store.patients_without_active_assignment().await?,
        })
    }

    pub async fn recent(&self, limit: usize) -> Result<RecentAssignments, AssignmentError> {
        let recent = self.store.recent_assignments(limit).await?;
        let week_ago = Utc::now() - chrono::Duration::days(7);
        let new_this_week = self
            .store
            .assignments()
            .await?
            .iter()
            .filter(|a| a.created_at >= week_ago)
            .count();

        Ok(RecentAssignments {
            assignments: self.join_names(recent).await?,
            new_this_week,
        })
    }

    /// Caregiver profile linked to an authenticated user, when one exists.
    pub async fn caregiver_id_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, AssignmentError> {
        Ok(self.store.caregiver_by_user(user_id).await?.map(|c| c.id))
    }

    async fn join_names(
        &self,
        assignments: Vec<Assignment>,
    ) -> Result<Vec<AssignmentView>, AssignmentError> {
        let patients: HashMap<Uuid, String> = self
            .store
            .patients()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let caregivers: HashMap<Uuid, String> = self
            .store
            .caregivers()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(assignments
            .into_iter()
            .map(|assignment| AssignmentView {
                patient_name: patients.get(&assignment.patient_id).cloned(),
                caregiver_name: caregivers.get(&assignment.caregiver_id).cloned(),
                assignment,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use shared_store::{MemoryStore, NewCaregiver, NewPatient};

    async fn setup() -> (Arc<AssignmentService>, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let patient = store
            .insert_patient(NewPatient {
                user_id: None,
                name: "Rosa Walsh".into(),
                address: None,
                medical_record: None,
            })
            .await
            .unwrap();
        let caregiver = store
            .insert_caregiver(NewCaregiver {
                user_id: None,
                name: "Niamh Byrne".into(),
                specialization: None,
                availability: true,
            })
            .await
            .unwrap();
        (
            Arc::new(AssignmentService::new(store)),
            patient.id,
            caregiver.id,
        )
    }

    fn request(patient_id: Uuid, caregiver_id: Uuid) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            patient_id: Some(patient_id),
            caregiver_id: Some(caregiver_id),
            start_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn second_active_assignment_conflicts() {
        let (service, patient_id, caregiver_id) = setup().await;

        service
            .create_assignment(request(patient_id, caregiver_id))
            .await
            .unwrap();
        assert_matches!(
            service
                .create_assignment(request(patient_id, caregiver_id))
                .await,
            Err(AssignmentError::DuplicateActive)
        );
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_one() {
        let (service, patient_id, caregiver_id) = setup().await;

        let (a, b) = tokio::join!(
            service.create_assignment(request(patient_id, caregiver_id)),
            service.create_assignment(request(patient_id, caregiver_id)),
        );

        assert_eq!(
            a.is_ok() as usize + b.is_ok() as usize,
            1,
            "exactly one create must win"
        );
        let loser = if a.is_err() { a } else { b };
        assert_matches!(loser, Err(AssignmentError::DuplicateActive));
    }

    #[tokio::test]
    async fn completing_frees_the_patient() {
        let (service, patient_id, caregiver_id) = setup().await;

        let first = service
            .create_assignment(request(patient_id, caregiver_id))
            .await
            .unwrap();
        let updated = service
            .update_status(
                first.id,
                UpdateAssignmentStatusRequest {
                    status: Some("completed".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Completed);
        assert!(updated.end_date.is_some());

        service
            .create_assignment(request(patient_id, caregiver_id))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn terminal_assignment_rejects_further_changes() {
        let (service, patient_id, caregiver_id) = setup().await;
        let assignment = service
            .create_assignment(request(patient_id, caregiver_id))
            .await
            .unwrap();

        service
            .update_status(
                assignment.id,
                UpdateAssignmentStatusRequest {
                    status: Some("terminated".to_string()),
                    notes: Some("moved away".to_string()),
                },
            )
            .await
            .unwrap();

        assert_matches!(
            service
                .update_status(
                    assignment.id,
                    UpdateAssignmentStatusRequest {
                        status: Some("active".to_string()),
                        notes: None,
                    },
                )
                .await,
            Err(AssignmentError::InvalidTransition(_))
        );
    }

    #[tokio::test]
    async fn notes_survive_a_status_update_without_notes() {
        let (service, patient_id, caregiver_id) = setup().await;
        let assignment = service
            .create_assignment(CreateAssignmentRequest {
                patient_id: Some(patient_id),
                caregiver_id: Some(caregiver_id),
                start_date: None,
                notes: Some("initial plan".to_string()),
            })
            .await
            .unwrap();

        let updated = service
            .update_status(
                assignment.id,
                UpdateAssignmentStatusRequest {
                    status: Some("completed".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("initial plan"));
    }

    #[tokio::test]
    async fn bad_status_and_missing_ids_are_rejected() {
        let (service, patient_id, caregiver_id) = setup().await;

        assert_matches!(
            service
                .create_assignment(CreateAssignmentRequest {
                    patient_id: None,
                    caregiver_id: Some(caregiver_id),
                    start_date: None,
                    notes: None,
                })
                .await,
            Err(AssignmentError::InvalidArgument(_))
        );

        let assignment = service
            .create_assignment(request(patient_id, caregiver_id))
            .await
            .unwrap();
        assert_matches!(
            service
                .update_status(
                    assignment.id,
                    UpdateAssignmentStatusRequest {
                        status: Some("paused".to_string()),
                        notes: None,
                    },
                )
                .await,
            Err(AssignmentError::InvalidArgument(_))
        );
    }

    #[tokio::test]
    async fn candidates_exclude_busy_patients_and_closed_caregivers() {
        let (service, patient_id, caregiver_id) = setup().await;

        let before = service.candidates().await.unwrap();
        assert_eq!(before.caregivers.len(), 1);
        assert_eq!(before.caregivers[0].active_patients, 0);
        assert_eq!(before.unassigned_patients.len(), 1);

        service
            .create_assignment(request(patient_id, caregiver_id))
            .await
            .unwrap();

        let after = service.candidates().await.unwrap();
        assert_eq!(after.caregivers[0].active_patients, 1);
        assert!(after.unassigned_patients.is_empty());
    }
}
