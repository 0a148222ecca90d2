//! Status transition engine shared by assignments and appointments.
//!
//! Both lifecycles follow the same shape: one working state, a set of
//! terminal states, and no way back out of a terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot change status from terminal state '{current}' to '{requested}'")]
pub struct InvalidTransition {
    pub current: String,
    pub requested: String,
}

/// A status enum with terminal states that reject every further change.
pub trait StatusLifecycle: Copy + Eq + fmt::Display {
    fn is_terminal(self) -> bool;
}

/// Validate and apply a requested status change.
///
/// Terminal states are final: any request against a terminal row fails,
/// including re-asserting the same terminal value.
pub fn apply_status<S: StatusLifecycle>(current: S, requested: S) -> Result<S, InvalidTransition> {
    if current.is_terminal() {
        return Err(InvalidTransition {
            current: current.to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(requested)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Completed,
    Terminated,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Active => write!(f, "active"),
            AssignmentStatus::Completed => write!(f, "completed"),
            AssignmentStatus::Terminated => write!(f, "terminated"),
        }
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AssignmentStatus::Active),
            "completed" => Ok(AssignmentStatus::Completed),
            "terminated" => Ok(AssignmentStatus::Terminated),
            other => Err(format!("invalid assignment status: {}", other)),
        }
    }
}

impl StatusLifecycle for AssignmentStatus {
    fn is_terminal(self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Terminated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("invalid appointment status: {}", other)),
        }
    }
}

impl StatusLifecycle for AppointmentStatus {
    fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}
