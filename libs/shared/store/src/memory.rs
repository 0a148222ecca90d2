//! In-memory `CareStore` backed by a single `RwLock` over all tables.
//!
//! Every composite write (cascaded delete, schedule replacement) runs under
//! one write-lock acquisition, so readers never observe partial state.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::lifecycle::AssignmentStatus;

use crate::records::*;
use crate::{CareStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    patients: HashMap<Uuid, Patient>,
    caregivers: HashMap<Uuid, Caregiver>,
    assignments: HashMap<Uuid, Assignment>,
    appointments: HashMap<Uuid, Appointment>,
    slots: HashMap<Uuid, ScheduleSlot>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CareStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.inner.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Duplicate(format!("user email {}", user.email)));
        }
        let row = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone_number: user.phone_number,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        let row = Patient {
            id: Uuid::new_v4(),
            user_id: patient.user_id,
            name: patient.name,
            address: patient.address,
            medical_record: patient.medical_record,
            created_at: Utc::now(),
        };
        self.inner.write().await.patients.insert(row.id, row.clone());
        Ok(row)
    }

    async fn patient(&self, id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self.inner.read().await.patients.get(&id).cloned())
    }

    async fn patient_by_user(&self, user_id: Uuid) -> StoreResult<Option<Patient>> {
        Ok(self
            .inner
            .read()
            .await
            .patients
            .values()
            .find(|p| p.user_id == Some(user_id))
            .cloned())
    }

    async fn patients(&self) -> StoreResult<Vec<Patient>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables.patients.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_patient(&self, patient: Patient) -> StoreResult<()> {
        let mut tables = self.inner.write().await;
        match tables.patients.get_mut(&patient.id) {
            Some(row) => {
                *row = patient;
                Ok(())
            }
            None => Err(StoreError::RowNotFound),
        }
    }

    async fn delete_patient(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        if tables.patients.remove(&id).is_none() {
            return Ok(false);
        }
        tables.assignments.retain(|_, a| a.patient_id != id);
        tables.appointments.retain(|_, a| a.patient_id != id);
        debug!("deleted patient {} with cascades", id);
        Ok(true)
    }

    async fn patients_without_active_assignment(&self) -> StoreResult<Vec<Patient>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables
            .patients
            .values()
            .filter(|p| {
                !tables
                    .assignments
                    .values()
                    .any(|a| a.patient_id == p.id && a.status == AssignmentStatus::Active)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_caregiver(&self, caregiver: NewCaregiver) -> StoreResult<Caregiver> {
        let row = Caregiver {
            id: Uuid::new_v4(),
            user_id: caregiver.user_id,
            name: caregiver.name,
            specialization: caregiver.specialization,
            availability: caregiver.availability,
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .caregivers
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn caregiver(&self, id: Uuid) -> StoreResult<Option<Caregiver>> {
        Ok(self.inner.read().await.caregivers.get(&id).cloned())
    }

    async fn caregiver_by_user(&self, user_id: Uuid) -> StoreResult<Option<Caregiver>> {
        Ok(self
            .inner
            .read()
            .await
            .caregivers
            .values()
            .find(|c| c.user_id == Some(user_id))
            .cloned())
    }

    async fn caregivers(&self) -> StoreResult<Vec<Caregiver>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables.caregivers.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_caregiver(&self, caregiver: Caregiver) -> StoreResult<()> {
        let mut tables = self.inner.write().await;
        match tables.caregivers.get_mut(&caregiver.id) {
            Some(row) => {
                *row = caregiver;
                Ok(())
            }
            None => Err(StoreError::RowNotFound),
        }
    }

    async fn delete_caregiver(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.inner.write().await;
        if tables.caregivers.remove(&id).is_none() {
            return Ok(false);
        }
        tables.assignments.retain(|_, a| a.caregiver_id != id);
        tables.appointments.retain(|_, a| a.caregiver_id != id);
        tables.slots.retain(|_, s| s.caregiver_id != id);
        debug!("deleted caregiver {} with cascades", id);
        Ok(true)
    }

    async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment> {
        let now = Utc::now();
        let row = Assignment {
            id: Uuid::new_v4(),
            patient_id: assignment.patient_id,
            caregiver_id: assignment.caregiver_id,
            start_date: assignment.start_date,
            end_date: None,
            status: AssignmentStatus::Active,
            notes: assignment.notes,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .assignments
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn assignment(&self, id: Uuid) -> StoreResult<Option<Assignment>> {
        Ok(self.inner.read().await.assignments.get(&id).cloned())
    }

    async fn assignments(&self) -> StoreResult<Vec<Assignment>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables.assignments.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_assignment(&self, assignment: Assignment) -> StoreResult<()> {
        let mut tables = self.inner.write().await;
        match tables.assignments.get_mut(&assignment.id) {
            Some(row) => {
                *row = assignment;
                Ok(())
            }
            None => Err(StoreError::RowNotFound),
        }
    }

    async fn active_assignment_for_patient(
        &self,
        patient_id: Uuid,
    ) -> StoreResult<Option<Assignment>> {
        Ok(self
            .inner
            .read()
            .await
            .assignments
            .values()
            .find(|a| a.patient_id == patient_id && a.status == AssignmentStatus::Active)
            .cloned())
    }

    async fn active_assignments_for_caregiver(
        &self,
        caregiver_id: Uuid,
    ) -> StoreResult<Vec<Assignment>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables
            .assignments
            .values()
            .filter(|a| a.caregiver_id == caregiver_id && a.status == AssignmentStatus::Active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn recent_assignments(&self, limit: usize) -> StoreResult<Vec<Assignment>> {
        let mut rows = self.assignments().await?;
        rows.truncate(limit);
        Ok(rows)
    }

    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment> {
        let now = Utc::now();
        let row = Appointment {
            id: Uuid::new_v4(),
            assignment_id: appointment.assignment_id,
            patient_id: appointment.patient_id,
            caregiver_id: appointment.caregiver_id,
            appointment_date: appointment.appointment_date,
            time_slot: appointment.time_slot,
            duration_minutes: appointment.duration_minutes,
            status: shared_models::lifecycle::AppointmentStatus::Scheduled,
            notes: appointment.notes,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .appointments
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>> {
        Ok(self.inner.read().await.appointments.get(&id).cloned())
    }

    async fn appointments(&self) -> StoreResult<Vec<Appointment>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables.appointments.values().cloned().collect();
        rows.sort_by(|a, b| {
            (a.appointment_date, a.time_slot).cmp(&(b.appointment_date, b.time_slot))
        });
        Ok(rows)
    }

    async fn update_appointment(&self, appointment: Appointment) -> StoreResult<()> {
        let mut tables = self.inner.write().await;
        match tables.appointments.get_mut(&appointment.id) {
            Some(row) => {
                *row = appointment;
                Ok(())
            }
            None => Err(StoreError::RowNotFound),
        }
    }

    async fn caregiver_appointments_on(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Appointment>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables
            .appointments
            .values()
            .filter(|a| a.caregiver_id == caregiver_id && a.appointment_date == date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.time_slot.cmp(&b.time_slot));
        Ok(rows)
    }

    async fn appointments_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Appointment>> {
        let mut rows = self.appointments().await?;
        rows.retain(|a| a.patient_id == patient_id);
        Ok(rows)
    }

    async fn appointments_for_caregiver(
        &self,
        caregiver_id: Uuid,
    ) -> StoreResult<Vec<Appointment>> {
        let mut rows = self.appointments().await?;
        rows.retain(|a| a.caregiver_id == caregiver_id);
        Ok(rows)
    }

    async fn replace_schedule(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
        windows: Vec<SlotWindow>,
    ) -> StoreResult<Vec<ScheduleSlot>> {
        let mut tables = self.inner.write().await;
        tables
            .slots
            .retain(|_, s| !(s.caregiver_id == caregiver_id && s.schedule_date == date));

        let now = Utc::now();
        let mut created = Vec::with_capacity(windows.len());
        for window in windows {
            let slot = ScheduleSlot {
                id: Uuid::new_v4(),
                caregiver_id,
                schedule_date: date,
                start_time: window.start,
                end_time: window.end,
                is_available: true,
                created_at: now,
            };
            tables.slots.insert(slot.id, slot.clone());
            created.push(slot);
        }
        created.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        debug!(
            "replaced schedule for caregiver {} on {}: {} slots",
            caregiver_id,
            date,
            created.len()
        );
        Ok(created)
    }

    async fn schedule_for(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<ScheduleSlot>> {
        let tables = self.inner.read().await;
        let mut rows: Vec<_> = tables
            .slots
            .values()
            .filter(|s| s.caregiver_id == caregiver_id && s.schedule_date == date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(rows)
    }

    async fn counts(&self) -> StoreResult<StoreCounts> {
        let tables = self.inner.read().await;
        let active: Vec<_> = tables
            .assignments
            .values()
            .filter(|a| a.status == AssignmentStatus::Active)
            .collect();
        let mut assigned_patients: Vec<_> = active.iter().map(|a| a.patient_id).collect();
        assigned_patients.sort_unstable();
        assigned_patients.dedup();

        Ok(StoreCounts {
            patients: tables.patients.len(),
            caregivers: tables.caregivers.len(),
            assigned_patients: assigned_patients.len(),
            active_assignments: active.len(),
            appointments: tables.appointments.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, NaiveTime};
    use shared_models::auth::Role;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    async fn seed_pair(store: &MemoryStore) -> (Patient, Caregiver) {
        let patient = store
            .insert_patient(NewPatient {
                user_id: None,
                name: "Rosa Walsh".into(),
                address: Some("12 Abbey Road".into()),
                medical_record: None,
            })
            .await
            .unwrap();
        let caregiver = store
            .insert_caregiver(NewCaregiver {
                user_id: None,
                name: "Niamh Byrne".into(),
                specialization: Some("Elder care".into()),
                availability: true,
            })
            .await
            .unwrap();
        (patient, caregiver)
    }

    #[tokio::test]
    async fn duplicate_user_email_rejected() {
        let store = MemoryStore::new();
        let user = NewUser {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@example.com".into(),
            phone_number: "+3531000000".into(),
            password_hash: "hash".into(),
            role: Role::Admin,
        };
        store.insert_user(user.clone()).await.unwrap();
        let mut again = user;
        again.email = "A@Example.com".into();
        assert_matches!(
            store.insert_user(again).await,
            Err(StoreError::Duplicate(_))
        );
    }

    #[tokio::test]
    async fn delete_patient_cascades() {
        let store = MemoryStore::new();
        let (patient, caregiver) = seed_pair(&store).await;

        let assignment = store
            .insert_assignment(NewAssignment {
                patient_id: patient.id,
                caregiver_id: caregiver.id,
                start_date: date("2024-01-01"),
                notes: None,
            })
            .await
            .unwrap();
        store
            .insert_appointment(NewAppointment {
                assignment_id: assignment.id,
                patient_id: patient.id,
                caregiver_id: caregiver.id,
                appointment_date: date("2024-01-02"),
                time_slot: time("09:30:00"),
                duration_minutes: 30,
                notes: None,
            })
            .await
            .unwrap();

        assert!(store.delete_patient(patient.id).await.unwrap());
        assert!(store.assignments().await.unwrap().is_empty());
        assert!(store.appointments().await.unwrap().is_empty());
        // A second delete reports the row as already gone.
        assert!(!store.delete_patient(patient.id).await.unwrap());
    }

    #[tokio::test]
    async fn replace_schedule_is_a_full_overwrite() {
        let store = MemoryStore::new();
        let (_, caregiver) = seed_pair(&store).await;
        let day = date("2024-01-02");
        let windows = vec![
            SlotWindow { start: time("09:00:00"), end: time("12:00:00") },
            SlotWindow { start: time("14:00:00"), end: time("17:00:00") },
        ];

        store
            .replace_schedule(caregiver.id, day, windows.clone())
            .await
            .unwrap();
        store
            .replace_schedule(caregiver.id, day, windows.clone())
            .await
            .unwrap();

        let slots = store.schedule_for(caregiver.id, day).await.unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start_time, time("09:00:00"));
        assert_eq!(slots[1].start_time, time("14:00:00"));

        // Other dates are untouched by a replacement.
        store
            .replace_schedule(caregiver.id, date("2024-01-03"), vec![])
            .await
            .unwrap();
        assert_eq!(store.schedule_for(caregiver.id, day).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn counts_track_distinct_assigned_patients() {
        let store = MemoryStore::new();
        let (patient, caregiver) = seed_pair(&store).await;
        store
            .insert_assignment(NewAssignment {
                patient_id: patient.id,
                caregiver_id: caregiver.id,
                start_date: date("2024-01-01"),
                notes: None,
            })
            .await
            .unwrap();

        let counts = store.counts().await.unwrap();
        assert_eq!(counts.patients, 1);
        assert_eq!(counts.caregivers, 1);
        assert_eq!(counts.assigned_patients, 1);
        assert_eq!(counts.active_assignments, 1);
        assert_eq!(counts.appointments, 0);
    }
}
