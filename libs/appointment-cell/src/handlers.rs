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

use crate::models::{BookAppointmentRequest, UpdateAppointmentStatusRequest};
use crate::services::booking::AppointmentBookingService;

fn require_staff(identity: &Identity) -> Result<(), AppError> {
    if !identity.is_admin() && !identity.is_caregiver() {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_staff(&identity)?;

    let view = service.book_appointment(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": view
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, AppError> {
    let appointments = service.list_for(&identity).await?;
    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(service): State<Arc<AppointmentBookingService>>,
    Extension(identity): Extension<Identity>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> Result<Json<Value>, AppError> {
    require_staff(&identity)?;

    let appointment = service.update_status(appointment_id, request).await?;
    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}
