use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::AppointmentBookingService;
use assignment_cell::router::{assignment_routes, dashboard_routes};
use assignment_cell::{AssignmentService, DashboardService};
use caregiver_cell::router::caregiver_routes;
use caregiver_cell::CaregiverService;
use patient_cell::router::patient_routes;
use patient_cell::PatientService;
use schedule_cell::router::schedule_routes;
use schedule_cell::{CaregiverDashboardService, ScheduleService, ScheduleState};
use shared_auth::AuthGateway;
use shared_store::CareStore;

pub fn create_router(store: Arc<dyn CareStore>, gateway: Arc<AuthGateway>) -> Router {
    // Services are built once here; each owns its own serialization gate.
    let patients = Arc::new(PatientService::new(store.clone()));
    let caregivers = Arc::new(CaregiverService::new(store.clone()));
    let assignments = Arc::new(AssignmentService::new(store.clone()));
    let dashboard = Arc::new(DashboardService::new(store.clone()));
    let schedule = Arc::new(ScheduleService::new(store.clone()));
    let caregiver_dashboard = Arc::new(CaregiverDashboardService::new(store.clone()));
    let bookings = Arc::new(AppointmentBookingService::new(
        store.clone(),
        schedule.clone(),
    ));
    let schedule_state = ScheduleState {
        schedule,
        dashboard: caregiver_dashboard,
    };

    Router::new()
        .route("/", get(|| async { "Carelink API is running!" }))
        .nest("/patients", patient_routes(patients, gateway.clone()))
        .nest("/caregivers", caregiver_routes(caregivers, gateway.clone()))
        .nest("/assignments", assignment_routes(assignments, gateway.clone()))
        .nest("/schedules", schedule_routes(schedule_state, gateway.clone()))
        .nest("/appointments", appointment_routes(bookings, gateway.clone()))
        .nest("/dashboard", dashboard_routes(dashboard, gateway))
}
