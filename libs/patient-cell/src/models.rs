use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_store::{Caregiver, Patient, StoreError};

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub medical_record: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub medical_record: Option<String>,
}

/// Patient row plus the caregiver currently assigned to them, if any.
#[derive(Debug, Serialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub assigned_caregiver: Option<Caregiver>,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound("Patient not found".to_string()),
            PatientError::InvalidArgument(msg) => AppError::BadRequest(msg),
            PatientError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
