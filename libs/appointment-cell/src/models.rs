use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use schedule_cell::ScheduleError;
use shared_models::error::AppError;
use shared_models::lifecycle::InvalidTransition;
use shared_store::{Appointment, StoreError};

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub assignment_id: Option<Uuid>,
    pub appointment_date: Option<NaiveDate>,
    pub time_slot: Option<NaiveTime>,
    /// Defaults to 30 minutes when omitted.
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: Option<String>,
    /// Existing notes are kept when this is omitted.
    pub notes: Option<String>,
}

/// Appointment row joined with display names.
#[derive(Debug, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: Option<String>,
    pub caregiver_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Active assignment not found")]
    AssignmentNotFound,

    #[error("Caregiver is not available at the requested time")]
    Unavailable,

    #[error("Appointment conflicts with an existing booking")]
    Conflict,

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            SchedulingError::AssignmentNotFound => {
                AppError::NotFound("Active assignment not found".to_string())
            }
            // Both scheduling failures surface as bad requests on this path.
            SchedulingError::Unavailable => {
                AppError::BadRequest("Caregiver is not available at the requested time".to_string())
            }
            SchedulingError::Conflict => {
                AppError::BadRequest("Appointment conflicts with an existing booking".to_string())
            }
            SchedulingError::InvalidArgument(msg) => AppError::BadRequest(msg),
            SchedulingError::InvalidTransition(e) => AppError::BadRequest(e.to_string()),
            SchedulingError::Schedule(e) => e.into(),
            SchedulingError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
