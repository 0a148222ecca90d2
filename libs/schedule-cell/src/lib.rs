pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::ScheduleState;
pub use models::*;
pub use services::dashboard::CaregiverDashboardService;
pub use services::schedule::ScheduleService;
