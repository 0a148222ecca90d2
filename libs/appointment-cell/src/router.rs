use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_auth::{auth_middleware, AuthGateway};

use crate::handlers;
use crate::services::booking::AppointmentBookingService;

pub fn appointment_routes(
    service: Arc<AppointmentBookingService>,
    gateway: Arc<AuthGateway>,
) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/", get(handlers::list_appointments))
        .route(
            "/{appointment_id}/status",
            patch(handlers::update_appointment_status),
        )
        .layer(middleware::from_fn_with_state(gateway, auth_middleware))
        .with_state(service)
}
