//! Entity store interface and the in-memory transactional implementation.
//!
//! Managers receive the store as `Arc<dyn CareStore>`; nothing in the
//! workspace reaches for a process-wide handle. The trait covers row-level
//! reads and writes plus the few composite writes (schedule replacement,
//! cascaded deletes) that must be atomic against the shared state.

pub mod memory;
pub mod records;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use records::*;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    RowNotFound,

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait CareStore: Send + Sync {
    // Users
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    // Patients
    async fn insert_patient(&self, patient: NewPatient) -> StoreResult<Patient>;
    async fn patient(&self, id: Uuid) -> StoreResult<Option<Patient>>;
    async fn patient_by_user(&self, user_id: Uuid) -> StoreResult<Option<Patient>>;
    async fn patients(&self) -> StoreResult<Vec<Patient>>;
    async fn update_patient(&self, patient: Patient) -> StoreResult<()>;
    /// Removes the patient and cascades to their assignments and
    /// appointments. Returns false when the id is unknown.
    async fn delete_patient(&self, id: Uuid) -> StoreResult<bool>;
    async fn patients_without_active_assignment(&self) -> StoreResult<Vec<Patient>>;

    // Caregivers
    async fn insert_caregiver(&self, caregiver: NewCaregiver) -> StoreResult<Caregiver>;
    async fn caregiver(&self, id: Uuid) -> StoreResult<Option<Caregiver>>;
    async fn caregiver_by_user(&self, user_id: Uuid) -> StoreResult<Option<Caregiver>>;
    async fn caregivers(&self) -> StoreResult<Vec<Caregiver>>;
    async fn update_caregiver(&self, caregiver: Caregiver) -> StoreResult<()>;
    /// Cascades to assignments, appointments and schedule slots.
    async fn delete_caregiver(&self, id: Uuid) -> StoreResult<bool>;

    // Assignments
    async fn insert_assignment(&self, assignment: NewAssignment) -> StoreResult<Assignment>;
    async fn assignment(&self, id: Uuid) -> StoreResult<Option<Assignment>>;
    async fn assignments(&self) -> StoreResult<Vec<Assignment>>;
    async fn update_assignment(&self, assignment: Assignment) -> StoreResult<()>;
    async fn active_assignment_for_patient(&self, patient_id: Uuid)
        -> StoreResult<Option<Assignment>>;
    async fn active_assignments_for_caregiver(&self, caregiver_id: Uuid)
        -> StoreResult<Vec<Assignment>>;
    /// Latest assignments first, capped at `limit`.
    async fn recent_assignments(&self, limit: usize) -> StoreResult<Vec<Assignment>>;

    // Appointments
    async fn insert_appointment(&self, appointment: NewAppointment) -> StoreResult<Appointment>;
    async fn appointment(&self, id: Uuid) -> StoreResult<Option<Appointment>>;
    async fn appointments(&self) -> StoreResult<Vec<Appointment>>;
    async fn update_appointment(&self, appointment: Appointment) -> StoreResult<()>;
    async fn caregiver_appointments_on(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Appointment>>;
    async fn appointments_for_patient(&self, patient_id: Uuid) -> StoreResult<Vec<Appointment>>;
    async fn appointments_for_caregiver(&self, caregiver_id: Uuid)
        -> StoreResult<Vec<Appointment>>;

    // Schedule ledger
    /// Full overwrite of the caregiver's slots for one date: delete then
    /// insert, atomically. Calling twice with the same windows yields the
    /// same final slot set.
    async fn replace_schedule(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
        windows: Vec<SlotWindow>,
    ) -> StoreResult<Vec<ScheduleSlot>>;
    async fn schedule_for(
        &self,
        caregiver_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<ScheduleSlot>>;

    // Dashboard
    async fn counts(&self) -> StoreResult<StoreCounts>;
}
