use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::lifecycle::InvalidTransition;
use shared_store::{Assignment, Caregiver, Patient, StoreError};

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub patient_id: Option<Uuid>,
    pub caregiver_id: Option<Uuid>,
    /// Defaults to today when omitted.
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentStatusRequest {
    pub status: Option<String>,
    /// Existing notes are kept when this is omitted.
    pub notes: Option<String>,
}

/// Assignment row joined with display names for listings.
#[derive(Debug, Serialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub patient_name: Option<String>,
    pub caregiver_name: Option<String>,
}

/// Caregiver accepting new assignments, with their current active load.
#[derive(Debug, Serialize)]
pub struct AvailableCaregiver {
    #[serde(flatten)]
    pub caregiver: Caregiver,
    pub active_patients: usize,
}

/// Candidates for a new assignment: open caregivers and unassigned patients.
#[derive(Debug, Serialize)]
pub struct AssignmentCandidates {
    pub caregivers: Vec<AvailableCaregiver>,
    pub unassigned_patients: Vec<Patient>,
}

#[derive(Debug, Serialize)]
pub struct RecentAssignments {
    pub assignments: Vec<AssignmentView>,
    pub new_this_week: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct StatusBreakdown {
    pub active: usize,
    pub completed: usize,
    pub terminated: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct AppointmentBreakdown {
    pub scheduled: usize,
    pub completed: usize,
    pub cancelled: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub assignments: StatusBreakdown,
    pub appointments: AppointmentBreakdown,
}

#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("Assignment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Caregiver not found")]
    CaregiverNotFound,

    #[error("Patient already has an active assignment")]
    DuplicateActive,

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AssignmentError> for AppError {
    fn from(err: AssignmentError) -> Self {
        match err {
            AssignmentError::NotFound => AppError::NotFound("Assignment not found".to_string()),
            AssignmentError::PatientNotFound => AppError::NotFound("Patient not found".to_string()),
            AssignmentError::CaregiverNotFound => {
                AppError::NotFound("Caregiver not found".to_string())
            }
            AssignmentError::DuplicateActive => {
                AppError::Conflict("Patient already has an active assignment".to_string())
            }
            AssignmentError::InvalidArgument(msg) => AppError::BadRequest(msg),
            AssignmentError::InvalidTransition(e) => AppError::BadRequest(e.to_string()),
            AssignmentError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
