use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_auth::{auth_middleware, AuthGateway};

use crate::handlers;
use crate::services::caregiver::CaregiverService;

pub fn caregiver_routes(service: Arc<CaregiverService>, gateway: Arc<AuthGateway>) -> Router {
    Router::new()
        .route("/", post(handlers::create_caregiver))
        .route("/", get(handlers::list_caregivers))
        .route("/{caregiver_id}", get(handlers::get_caregiver))
        .route("/{caregiver_id}", put(handlers::update_caregiver))
        .route("/{caregiver_id}", delete(handlers::delete_caregiver))
        .layer(middleware::from_fn_with_state(gateway, auth_middleware))
        .with_state(service)
}
