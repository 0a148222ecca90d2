use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::Identity;
use shared_models::error::AppError;

use crate::models::SetScheduleRequest;
use crate::services::dashboard::CaregiverDashboardService;
use crate::services::schedule::ScheduleService;

#[derive(Clone)]
pub struct ScheduleState {
    pub schedule: Arc<ScheduleService>,
    pub dashboard: Arc<CaregiverDashboardService>,
}

/// Admins may set any schedule; caregivers only their own.
#[axum::debug_handler]
pub async fn set_schedule(
    State(state): State<ScheduleState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<SetScheduleRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if identity.is_caregiver() {
        let own = state
            .schedule
            .caregiver_id_for_user(identity.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Caregiver profile not found".to_string()))?;
        if request.caregiver_id != Some(own) {
            return Err(AppError::Forbidden(
                "Caregivers can only set their own schedule".to_string(),
            ));
        }
    } else if !identity.is_admin() {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }

    let slots = state.schedule.set_schedule(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "slots": slots,
            "total": slots.len()
        })),
    ))
}

#[axum::debug_handler]
pub async fn day_schedule(
    State(state): State<ScheduleState>,
    Extension(_identity): Extension<Identity>,
    Path((caregiver_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let slots = state.schedule.day_schedule(caregiver_id, date).await?;
    Ok(Json(json!({
        "caregiver_id": caregiver_id,
        "date": date,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn caregiver_dashboard(
    State(state): State<ScheduleState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    if !identity.is_caregiver() {
        return Err(AppError::Forbidden("Caregiver access required".to_string()));
    }

    let dashboard = state.dashboard.for_user(identity.user_id).await?;
    Ok(Json(json!(dashboard)))
}
