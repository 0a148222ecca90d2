use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_auth::{auth_middleware, AuthGateway};

use crate::handlers::{self, ScheduleState};

pub fn schedule_routes(state: ScheduleState, gateway: Arc<AuthGateway>) -> Router {
    Router::new()
        .route("/", post(handlers::set_schedule))
        .route("/dashboard", get(handlers::caregiver_dashboard))
        .route("/{caregiver_id}/{date}", get(handlers::day_schedule))
        .layer(middleware::from_fn_with_state(gateway, auth_middleware))
        .with_state(state)
}
