pub mod caregiver;
