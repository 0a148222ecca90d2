use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_auth::{auth_middleware, AuthGateway};

use crate::handlers;
use crate::services::patient::PatientService;

pub fn patient_routes(service: Arc<PatientService>, gateway: Arc<AuthGateway>) -> Router {
    Router::new()
        .route("/", post(handlers::create_patient))
        .route("/", get(handlers::list_patients))
        .route("/{patient_id}", get(handlers::get_patient))
        .route("/{patient_id}", put(handlers::update_patient))
        .route("/{patient_id}", delete(handlers::delete_patient))
        .layer(middleware::from_fn_with_state(gateway, auth_middleware))
        .with_state(service)
}
