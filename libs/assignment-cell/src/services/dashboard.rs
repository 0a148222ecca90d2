use std::sync::Arc;

use shared_models::lifecycle::{AppointmentStatus, AssignmentStatus};
use shared_store::{CareStore, StoreCounts};

use crate::models::{AppointmentBreakdown, AssignmentError, DashboardStats, StatusBreakdown};

/// Admin dashboard aggregates.
pub struct DashboardService {
    store: Arc<dyn CareStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    pub async fn counts(&self) -> Result<StoreCounts, AssignmentError> {
        Ok(self.store.counts().await?)
    }

    pub async fn stats(&self) -> Result<DashboardStats, AssignmentError> {
        let mut assignments = StatusBreakdown::default();
        for assignment in self.store.assignments().await? {
            match assignment.status {
                AssignmentStatus::Active => assignments.active += 1,
                AssignmentStatus::Completed => assignments.completed += 1,
                AssignmentStatus::Terminated => assignments.terminated += 1,
            }
        }

        let mut appointments = AppointmentBreakdown::default();
        for appointment in self.store.appointments().await? {
            match appointment.status {
                AppointmentStatus::Scheduled => appointments.scheduled += 1,
                AppointmentStatus::Completed => appointments.completed += 1,
                AppointmentStatus::Cancelled => appointments.cancelled += 1,
            }
        }

        Ok(DashboardStats {
            assignments,
            appointments,
        })
    }
}
