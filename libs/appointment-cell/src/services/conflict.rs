//! Interval overlap for appointment windows.
//!
//! A booking occupies the half-open window [time_slot, time_slot + duration).
//! Back-to-back bookings that touch at a boundary do not conflict. The math
//! runs on minutes from midnight so windows never wrap through `NaiveTime`
//! arithmetic.

use chrono::{NaiveTime, Timelike};

fn minutes_from_midnight(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 / 60
}

pub fn windows_overlap(
    start_a: NaiveTime,
    duration_a: i64,
    start_b: NaiveTime,
    duration_b: i64,
) -> bool {
    let a_start = minutes_from_midnight(start_a);
    let a_end = a_start + duration_a;
    let b_start = minutes_from_midnight(start_b);
    let b_end = b_start + duration_b;

    a_start < b_end && b_start < a_end
}
