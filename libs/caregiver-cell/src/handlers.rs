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

use crate::models::{CreateCaregiverRequest, UpdateCaregiverRequest};
use crate::services::caregiver::CaregiverService;

fn require_admin(identity: &Identity) -> Result<(), AppError> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_caregiver(
    State(service): State<Arc<CaregiverService>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateCaregiverRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&identity)?;

    let caregiver = service.create_caregiver(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "caregiver": caregiver
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_caregiver(
    State(service): State<Arc<CaregiverService>>,
    Extension(_identity): Extension<Identity>,
    Path(caregiver_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let caregiver = service.get_caregiver(caregiver_id).await?;
    Ok(Json(json!(caregiver)))
}

#[axum::debug_handler]
pub async fn list_caregivers(
    State(service): State<Arc<CaregiverService>>,
    Extension(_identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let caregivers = service.list_caregivers().await?;
    Ok(Json(json!({
        "caregivers": caregivers,
        "total": caregivers.len()
    })))
}

#[axum::debug_handler]
pub async fn update_caregiver(
    State(service): State<Arc<CaregiverService>>,
    Extension(identity): Extension<Identity>,
    Path(caregiver_id): Path<Uuid>,
    Json(request): Json<UpdateCaregiverRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    let caregiver = service.update_caregiver(caregiver_id, request).await?;
    Ok(Json(json!({
        "success": true,
        "caregiver": caregiver
    })))
}

#[axum::debug_handler]
pub async fn delete_caregiver(
    State(service): State<Arc<CaregiverService>>,
    Extension(identity): Extension<Identity>,
    Path(caregiver_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    service.delete_caregiver(caregiver_id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Caregiver deleted"
    })))
}
