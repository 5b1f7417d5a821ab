//! Slot computation. Everything here is pure: same inputs, same slots, no
//! I/O, so callers may query as often as they like.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DayOfWeek, WorkingSchedule};

/// How far ahead of today availability may be queried or booked.
pub const BOOKING_HORIZON_DAYS: i64 = 365;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Validation error: {0}")]
    Validation(String),
}

/// An occupied half-open `[start, end)` range in business local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BookedInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Half-open overlap: touching endpoints do not conflict.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end && end > self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuery {
    pub barber_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: i64,
}

impl SlotQuery {
    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from(self.date.weekday())
    }
}

/// Computes bookable start times for `query.date`.
///
/// Candidates start at the opening time and advance by `step_minutes`; a
/// candidate survives when it ends at or before closing time, starts strictly
/// after `now` on the current day, and overlaps no booked interval. `now` is
/// the current business local date-time.
pub fn compute_slots(
    query: &SlotQuery,
    schedule: Option<&WorkingSchedule>,
    booked: &[BookedInterval],
    step_minutes: i64,
    now: NaiveDateTime,
) -> Result<Vec<NaiveTime>, AvailabilityError> {
    if query.duration_minutes <= 0 {
        return Err(AvailabilityError::Validation(
            "Service duration must be positive".to_string(),
        ));
    }
    if step_minutes <= 0 {
        return Err(AvailabilityError::Validation(
            "Slot step must be positive".to_string(),
        ));
    }

    let schedule = match schedule {
        Some(entry) if entry.is_open() && entry.day_of_week == query.day_of_week() => entry,
        _ => return Ok(Vec::new()),
    };

    let today = now.date();
    if query.date < today {
        return Ok(Vec::new());
    }
    ensure_within_horizon(query.date, today)?;

    let duration = Duration::minutes(query.duration_minutes);
    let step = Duration::minutes(step_minutes);
    let opens = query.date.and_time(schedule.start_time);
    let closes = query.date.and_time(schedule.end_time);

    let mut slots = Vec::new();
    let mut candidate = opens;

    while let Some(end) = candidate.checked_add_signed(duration) {
        if end > closes {
            break;
        }
        let already_started = query.date == today && candidate <= now;
        let taken = booked.iter().any(|b| b.overlaps(candidate, end));

        if !already_started && !taken {
            slots.push(candidate.time());
        }

        match candidate.checked_add_signed(step) {
            Some(next) => candidate = next,
            None => break,
        }
    }

    Ok(slots)
}

/// Rejects dates more than `BOOKING_HORIZON_DAYS` after `today`.
pub fn ensure_within_horizon(date: NaiveDate, today: NaiveDate) -> Result<(), AvailabilityError> {
    if (date - today).num_days() > BOOKING_HORIZON_DAYS {
        return Err(AvailabilityError::Validation(format!(
            "Date must be within {} days from today",
            BOOKING_HORIZON_DAYS
        )));
    }
    Ok(())
}

/// True when `[start, start + duration)` sits inside the open window.
pub fn fits_schedule(
    schedule: Option<&WorkingSchedule>,
    start: NaiveDateTime,
    duration_minutes: i64,
) -> bool {
    let Some(schedule) = schedule.filter(|s| s.is_open()) else {
        return false;
    };
    let Some(end) = start.checked_add_signed(Duration::minutes(duration_minutes)) else {
        return false;
    };

    DayOfWeek::from(start.date().weekday()) == schedule.day_of_week
        && end.date() == start.date()
        && start.time() >= schedule.start_time
        && end.time() <= schedule.end_time
}
