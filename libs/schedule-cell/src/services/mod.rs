pub mod dashboard;
pub mod schedule;
