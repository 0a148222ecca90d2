use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::Role;
use shared_models::lifecycle::{AppointmentStatus, AssignmentStatus};

pub const DEFAULT_APPOINTMENT_DURATION_MINUTES: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub medical_record: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub medical_record: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caregiver {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub specialization: Option<String>,
    /// Coarse "accepting new assignments" switch, independent of the
    /// per-date schedule ledger.
    pub availability: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCaregiver {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub specialization: Option<String>,
    pub availability: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub caregiver_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub patient_id: Uuid,
    pub caregiver_id: Uuid,
    pub start_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub assignment_id: Uuid,
    // Denormalized from the assignment for direct lookup.
    pub patient_id: Uuid,
    pub caregiver_id: Uuid,
    pub appointment_date: NaiveDate,
    pub time_slot: NaiveTime,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub assignment_id: Uuid,
    pub patient_id: Uuid,
    pub caregiver_id: Uuid,
    pub appointment_date: NaiveDate,
    pub time_slot: NaiveTime,
    pub duration_minutes: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: Uuid,
    pub caregiver_id: Uuid,
    pub schedule_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

/// Open window declared by a caregiver; the stored row adds identity and
/// the availability flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreCounts {
    pub patients: usize,
    pub caregivers: usize,
    pub assigned_patients: usize,
    pub active_assignments: usize,
    pub appointments: usize,
}
