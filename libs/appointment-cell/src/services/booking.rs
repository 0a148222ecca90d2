use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use schedule_cell::ScheduleService;
use shared_models::auth::{Identity, Role};
use shared_models::lifecycle::{apply_status, AppointmentStatus, AssignmentStatus};
use shared_store::{
    Appointment, CareStore, NewAppointment, DEFAULT_APPOINTMENT_DURATION_MINUTES,
};

use crate::models::{
    AppointmentView, BookAppointmentRequest, SchedulingError, UpdateAppointmentStatusRequest,
};
use crate::services::conflict::windows_overlap;

pub struct AppointmentBookingService {
    store: Arc<dyn CareStore>,
    schedule: Arc<ScheduleService>,
    // Serializes the availability/conflict checks against the insert.
    booking_gate: Mutex<()>,
}

impl AppointmentBookingService {
    pub fn new(store: Arc<dyn CareStore>, schedule: Arc<ScheduleService>) -> Self {
        Self {
            store,
            schedule,
            booking_gate: Mutex::new(()),
        }
    }

    /// Books a visit against an active assignment. The caregiver must have
    /// an open slot covering the time, and no other scheduled appointment of
    /// theirs may overlap the requested window that day.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<AppointmentView, SchedulingError> {
        let assignment_id = request.assignment_id.ok_or_else(|| {
            SchedulingError::InvalidArgument("assignment_id is required".to_string())
        })?;
        let date = request.appointment_date.ok_or_else(|| {
            SchedulingError::InvalidArgument("appointment_date is required".to_string())
        })?;
        let time = request.time_slot.ok_or_else(|| {
            SchedulingError::InvalidArgument("time_slot is required".to_string())
        })?;
        let duration = request
            .duration_minutes
            .unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES);
        if duration <= 0 {
            return Err(SchedulingError::InvalidArgument(
                "duration_minutes must be positive".to_string(),
            ));
        }

        let _guard = self.booking_gate.lock().await;

        let assignment = self
            .store
            .assignment(assignment_id)
            .await?
            .filter(|a| a.status == AssignmentStatus::Active)
            .ok_or(SchedulingError::AssignmentNotFound)?;

        if !self
            .schedule
            .is_available(assignment.caregiver_id, date, time)
            .await?
        {
            return Err(SchedulingError::Unavailable);
        }

        let booked = self
            .store
            .caregiver_appointments_on(assignment.caregiver_id, date)
            .await?;
        let collides = booked
            .iter()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .any(|a| windows_overlap(time, duration, a.time_slot, a.duration_minutes));
        if collides {
            return Err(SchedulingError::Conflict);
        }

        let appointment = self
            .store
            .insert_appointment(NewAppointment {
                assignment_id,
                patient_id: assignment.patient_id,
                caregiver_id: assignment.caregiver_id,
                appointment_date: date,
                time_slot: time,
                duration_minutes: duration,
                notes: request.notes,
            })
            .await?;

        info!(
            "Booked appointment {} for caregiver {} on {} at {}",
            appointment.id, appointment.caregiver_id, date, time
        );
        self.join_one(appointment).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateAppointmentStatusRequest,
    ) -> Result<Appointment, SchedulingError> {
        let requested = request
            .status
            .ok_or_else(|| SchedulingError::InvalidArgument("status is required".to_string()))?
            .parse::<AppointmentStatus>()
            .map_err(SchedulingError::InvalidArgument)?;

        let mut appointment = self
            .store
            .appointment(id)
            .await?
            .ok_or(SchedulingError::NotFound)?;

        appointment.status = apply_status(appointment.status, requested)?;
        if let Some(notes) = request.notes {
            appointment.notes = Some(notes);
        }
        appointment.updated_at = Utc::now();

        self.store.update_appointment(appointment.clone()).await?;
        info!("Appointment {} is now {}", id, appointment.status);
        Ok(appointment)
    }

    /// Listing scoped by caller role: admins see everything, caregivers and
    /// patients only their own visits.
    pub async fn list_for(
        &self,
        identity: &Identity,
    ) -> Result<Vec<AppointmentView>, SchedulingError> {
        let appointments = match identity.role {
            Role::Admin => self.store.appointments().await?,
            Role::Caregiver => match self.store.caregiver_by_user(identity.user_id).await? {
                Some(caregiver) => self.store.appointments_for_caregiver(caregiver.id).await?,
                None => Vec::new(),
            },
            Role::Patient => match self.store.patient_by_user(identity.user_id).await? {
                Some(patient) => self.store.appointments_for_patient(patient.id).await?,
                None => Vec::new(),
            },
        };
        self.join_names(appointments).await
    }

    async fn join_one(
        &self,
        appointment: Appointment,
    ) -> Result<AppointmentView, SchedulingError> {
        let patient_name = self
            .store
            .patient(appointment.patient_id)
            .await?
            .map(|p| p.name);
        let caregiver_name = self
            .store
            .caregiver(appointment.caregiver_id)
            .await?
            .map(|c| c.name);
        Ok(AppointmentView {
            appointment,
            patient_name,
            caregiver_name,
        })
    }

    async fn join_names(
        &self,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentView>, SchedulingError> {
        let patients: HashMap<Uuid, String> = self
            .store
            .patients()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let caregivers: HashMap<Uuid, String> = self
            .store
            .caregivers()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(appointments
            .into_iter()
            .map(|appointment| AppointmentView {
                patient_name: patients.get(&appointment.patient_id).cloned(),
                caregiver_name: caregivers.get(&appointment.caregiver_id).cloned(),
                appointment,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, NaiveTime};
    use shared_store::{MemoryStore, NewAssignment, NewCaregiver, NewPatient, SlotWindow};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    struct Fixture {
        service: Arc<AppointmentBookingService>,
        assignment_id: Uuid,
    }

    async fn setup() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let patient = store
            .insert_patient(NewPatient {
                user_id: None,
                name: "Rosa Walsh".into(),
                address: None,
                medical_record: None,
            })
            .await
            .unwrap();
        let caregiver = store
            .insert_caregiver(NewCaregiver {
                user_id: None,
                name: "Niamh Byrne".into(),
                specialization: None,
                availability: true,
            })
            .await
            .unwrap();
        let assignment = store
            .insert_assignment(NewAssignment {
                patient_id: patient.id,
                caregiver_id: caregiver.id,
                start_date: date("2024-03-01"),
                notes: None,
            })
            .await
            .unwrap();
        store
            .replace_schedule(
                caregiver.id,
                date("2024-03-04"),
                vec![SlotWindow {
                    start: time("09:00:00"),
                    end: time("12:00:00"),
                }],
            )
            .await
            .unwrap();

        let schedule = Arc::new(ScheduleService::new(store.clone() as Arc<dyn CareStore>));
        Fixture {
            service: Arc::new(AppointmentBookingService::new(store, schedule)),
            assignment_id: assignment.id,
        }
    }

    fn booking(assignment_id: Uuid, at: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            assignment_id: Some(assignment_id),
            appointment_date: Some(date("2024-03-04")),
            time_slot: Some(time(at)),
            duration_minutes: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn booking_defaults_to_thirty_minutes() {
        let fixture = setup().await;
        let view = fixture
            .service
            .book_appointment(booking(fixture.assignment_id, "09:30:00"))
            .await
            .unwrap();
        assert_eq!(view.appointment.duration_minutes, 30);
        assert_eq!(view.appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(view.patient_name.as_deref(), Some("Rosa Walsh"));
        assert_eq!(view.caregiver_name.as_deref(), Some("Niamh Byrne"));
    }

    #[tokio::test]
    async fn overlapping_booking_conflicts_but_back_to_back_fits() {
        let fixture = setup().await;
        fixture
            .service
            .book_appointment(booking(fixture.assignment_id, "09:30:00"))
            .await
            .unwrap();

        assert_matches!(
            fixture
                .service
                .book_appointment(booking(fixture.assignment_id, "09:45:00"))
                .await,
            Err(SchedulingError::Conflict)
        );

        fixture
            .service
            .book_appointment(booking(fixture.assignment_id, "10:00:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_appointments_do_not_block_the_slot() {
        let fixture = setup().await;
        let first = fixture
            .service
            .book_appointment(booking(fixture.assignment_id, "09:30:00"))
            .await
            .unwrap();
        fixture
            .service
            .update_status(
                first.appointment.id,
                UpdateAppointmentStatusRequest {
                    status: Some("cancelled".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();

        fixture
            .service
            .book_appointment(booking(fixture.assignment_id, "09:30:00"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn booking_outside_the_schedule_is_unavailable() {
        let fixture = setup().await;
        assert_matches!(
            fixture
                .service
                .book_appointment(booking(fixture.assignment_id, "14:00:00"))
                .await,
            Err(SchedulingError::Unavailable)
        );
    }

    #[tokio::test]
    async fn inactive_assignment_cannot_be_booked() {
        let fixture = setup().await;
        assert_matches!(
            fixture
                .service
                .book_appointment(booking(Uuid::new_v4(), "09:30:00"))
                .await,
            Err(SchedulingError::AssignmentNotFound)
        );
    }

    #[tokio::test]
    async fn missing_fields_are_invalid() {
        let fixture = setup().await;
        let request = BookAppointmentRequest {
            assignment_id: Some(fixture.assignment_id),
            appointment_date: None,
            time_slot: Some(time("09:30:00")),
            duration_minutes: None,
            notes: None,
        };
        assert_matches!(
            fixture.service.book_appointment(request).await,
            Err(SchedulingError::InvalidArgument(_))
        );
    }

    #[tokio::test]
    async fn completed_appointment_rejects_rescheduling() {
        let fixture = setup().await;
        let view = fixture
            .service
            .book_appointment(booking(fixture.assignment_id, "09:30:00"))
            .await
            .unwrap();
        fixture
            .service
            .update_status(
                view.appointment.id,
                UpdateAppointmentStatusRequest {
                    status: Some("completed".to_string()),
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_matches!(
            fixture
                .service
                .update_status(
                    view.appointment.id,
                    UpdateAppointmentStatusRequest {
                        status: Some("scheduled".to_string()),
                        notes: None,
                    },
                )
                .await,
            Err(SchedulingError::InvalidTransition(_))
        );
    }

    #[tokio::test]
    async fn concurrent_bookings_for_one_window_admit_exactly_one() {
        let fixture = setup().await;
        let (a, b) = tokio::join!(
            fixture
                .service
                .book_appointment(booking(fixture.assignment_id, "09:30:00")),
            fixture
                .service
                .book_appointment(booking(fixture.assignment_id, "09:45:00")),
        );
        assert_eq!(
            a.is_ok() as usize + b.is_ok() as usize,
            1,
            "exactly one booking must win"
        );
    }
}
