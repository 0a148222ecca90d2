use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use shared_models::lifecycle::AppointmentStatus;
use shared_store::CareStore;

use crate::models::{AssignedPatient, CaregiverDashboard, NextVisit, ScheduleError};

/// Per-caregiver overview: assigned patients, today's visits, workload
/// counters.
pub struct CaregiverDashboardService {
    store: Arc<dyn CareStore>,
}

impl CaregiverDashboardService {
    pub fn new(store: Arc<dyn CareStore>) -> Self {
        Self { store }
    }

    /// Dashboard for the caregiver profile linked to the authenticated user.
    pub async fn for_user(&self, user_id: Uuid) -> Result<CaregiverDashboard, ScheduleError> {
        let caregiver = self
            .store
            .caregiver_by_user(user_id)
            .await?
            .ok_or(ScheduleError::CaregiverNotFound)?;
        self.for_caregiver(caregiver.id).await
    }

    pub async fn for_caregiver(
        &self,
        caregiver_id: Uuid,
    ) -> Result<CaregiverDashboard, ScheduleError> {
        let caregiver = self
            .store
            .caregiver(caregiver_id)
            .await?
            .ok_or(ScheduleError::CaregiverNotFound)?;

        let today = Utc::now().date_naive();
        let appointments = self.store.appointments_for_caregiver(caregiver_id).await?;

        let todays_appointments: Vec<_> = appointments
            .iter()
            .filter(|a| a.appointment_date == today && a.status == AppointmentStatus::Scheduled)
            .cloned()
            .collect();
        let pending = appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .count();
        let completed = appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Completed)
            .count();

        let mut assigned_patients = Vec::new();
        for assignment in self
            .store
            .active_assignments_for_caregiver(caregiver_id)
            .await?
        {
            let Some(patient) = self.store.patient(assignment.patient_id).await? else {
                continue;
            };
            // Appointments are ordered by date and time, so the first
            // upcoming scheduled one is the next visit.
            let next_visit = appointments
                .iter()
                .find(|a| {
                    a.patient_id == patient.id
                        && a.status == AppointmentStatus::Scheduled
                        && a.appointment_date >= today
                })
                .map(|a| NextVisit {
                    appointment_date: a.appointment_date,
                    time_slot: a.time_slot,
                });
            assigned_patients.push(AssignedPatient {
                patient_id: patient.id,
                name: patient.name,
                next_visit,
            });
        }

        Ok(CaregiverDashboard {
            caregiver_id,
            caregiver_name: caregiver.name,
            assigned_patients,
            todays_appointments,
            pending_appointments: pending,
            completed_appointments: completed,
        })
    }
}
