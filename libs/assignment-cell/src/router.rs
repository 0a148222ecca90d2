use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_auth::{auth_middleware, AuthGateway};

use crate::handlers;
use crate::services::assignment::AssignmentService;
use crate::services::dashboard::DashboardService;

pub fn assignment_routes(service: Arc<AssignmentService>, gateway: Arc<AuthGateway>) -> Router {
    Router::new()
        .route("/", post(handlers::create_assignment))
        .route("/", get(handlers::list_assignments))
        .route("/available", get(handlers::list_candidates))
        .route("/recent", get(handlers::recent_assignments))
        .route("/{assignment_id}/status", patch(handlers::update_assignment_status))
        .layer(middleware::from_fn_with_state(gateway, auth_middleware))
        .with_state(service)
}

pub fn dashboard_routes(service: Arc<DashboardService>, gateway: Arc<AuthGateway>) -> Router {
    Router::new()
        .route("/counts", get(handlers::dashboard_counts))
        .route("/stats", get(handlers::dashboard_stats))
        .layer(middleware::from_fn_with_state(gateway, auth_middleware))
        .with_state(service)
}
