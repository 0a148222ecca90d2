use serde::Deserialize;
use thiserror::Error;

use shared_models::error::AppError;
use shared_store::StoreError;

#[derive(Debug, Deserialize)]
pub struct CreateCaregiverRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    /// Accepting new assignments. Defaults to true.
    pub availability: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCaregiverRequest {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub availability: Option<bool>,
}

#[derive(Debug, Error)]
pub enum CaregiverError {
    #[error("Caregiver not found")]
    NotFound,

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CaregiverError> for AppError {
    fn from(err: CaregiverError) -> Self {
        match err {
            CaregiverError::NotFound => AppError::NotFound("Caregiver not found".to_string()),
            CaregiverError::InvalidArgument(msg) => AppError::BadRequest(msg),
            CaregiverError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}
