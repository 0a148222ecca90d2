pub mod assignment;
pub mod dashboard;
