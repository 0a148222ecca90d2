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

use crate::models::{CreateAssignmentRequest, UpdateAssignmentStatusRequest};
use crate::services::assignment::AssignmentService;
use crate::services::dashboard::DashboardService;

const RECENT_LIMIT: usize = 5;

fn require_admin(identity: &Identity) -> Result<(), AppError> {
    if !identity.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_assignment(
    State(service): State<Arc<AssignmentService>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_admin(&identity)?;

    let assignment = service.create_assignment(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "assignmentId": assignment.id,
            "assignment": assignment
        })),
    ))
}

/// Admins see every active assignment; caregivers see their own.
#[axum::debug_handler]
pub async fn list_assignments(
    State(service): State<Arc<AssignmentService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let filter = if identity.is_admin() {
        None
    } else if identity.is_caregiver() {
        let caregiver_id = service
            .caregiver_id_for_user(identity.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Caregiver profile not found".to_string()))?;
        Some(caregiver_id)
    } else {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    };

    let assignments = service.list_active(filter).await?;
    Ok(Json(json!({
        "assignments": assignments,
        "total": assignments.len()
    })))
}

#[axum::debug_handler]
pub async fn list_candidates(
    State(service): State<Arc<AssignmentService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    let candidates = service.candidates().await?;
    Ok(Json(json!(candidates)))
}

#[axum::debug_handler]
pub async fn recent_assignments(
    State(service): State<Arc<AssignmentService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    let recent = service.recent(RECENT_LIMIT).await?;
    Ok(Json(json!(recent)))
}

#[axum::debug_handler]
pub async fn update_assignment_status(
    State(service): State<Arc<AssignmentService>>,
    Extension(identity): Extension<Identity>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<UpdateAssignmentStatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    let assignment = service.update_status(assignment_id, request).await?;
    Ok(Json(json!({
        "success": true,
        "assignment": assignment
    })))
}

#[axum::debug_handler]
pub async fn dashboard_counts(
    State(service): State<Arc<DashboardService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    let counts = service.counts().await?;
    Ok(Json(json!(counts)))
}

#[axum::debug_handler]
pub async fn dashboard_stats(
    State(service): State<Arc<DashboardService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    require_admin(&identity)?;

    let stats = service.stats().await?;
    Ok(Json(json!(stats)))
}
