use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_store::{Appointment, StoreError};

#[derive(Debug, Clone, Deserialize)]
pub struct SlotInput {
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Deserialize)]
pub struct SetScheduleRequest {
    pub caregiver_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub slots: Option<Vec<SlotInput>>,
}

/// Assigned patient with their next scheduled visit, for the caregiver
/// dashboard.
#[derive(Debug, Serialize)]
pub struct AssignedPatient {
    pub patient_id: Uuid,
    pub name: String,
    pub next_visit: Option<NextVisit>,
}

#[derive(Debug, Serialize)]
pub struct NextVisit {
    pub appointment_date: NaiveDate,
    pub time_slot: NaiveTime,
}

#[derive(Debug, Serialize)]
pub struct CaregiverDashboard {
    pub caregiver_id: Uuid,
    pub caregiver_name: String,
    pub assigned_patients: Vec<AssignedPatient>,
    pub todays_appointments: Vec<Appointment>,
    pub pending_appointments: usize,
    pub completed_appointments: usize,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Caregiver not found")]
    CaregiverNotFound,

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::CaregiverNotFound => {
                AppError::NotFound("Caregiver not found".to_string())
            }
            ScheduleError::InvalidArgument(msg) => AppError::BadRequest(msg),
            ScheduleError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
