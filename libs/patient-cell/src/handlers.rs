use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Identity;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, UpdatePatientRequest};
use crate::services::patient::PatientService;

fn require_admin(identity: &Identity) -> Result<(), AppError> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

fn require_staff(identity: &Identity) -> Result<(), AppError> {
    if !identity.is_admin() && !identity.is_caregiver() {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_patient(
    State(service): State<Arc<PatientService>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&identity)?;

    let patient = service.create_patient(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "patient": patient
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(service): State<Arc<PatientService>>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_staff(&identity)?;

    let detail = service.get_patient(patient_id).await?;
    Ok(Json(json!(detail)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(service): State<Arc<PatientService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    require_staff(&identity)?;

    let patients = service.list_patients().await?;
    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(service): State<Arc<PatientService>>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    let patient = service.update_patient(patient_id, request).await?;
    Ok(Json(json!({
        "success": true,
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(service): State<Arc<PatientService>>,
    Extension(identity): Extension<Identity>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    service.delete_patient(patient_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Patient deleted"
    })))
}
