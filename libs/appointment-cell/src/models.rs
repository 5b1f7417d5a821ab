use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use barber_cell::models::{BarberError, ServiceKind, ServiceRef};
use barber_cell::services::AvailabilityError;
use shared_database::DatabaseError;
use shared_models::error::AppError;

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub barber_id: Uuid,
    pub service_kind: ServiceKind,
    pub service_id: Uuid,
    /// Name, duration and effective price as they were when booked.
    pub service_name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn service_ref(&self) -> ServiceRef {
        ServiceRef::from_parts(self.service_kind, self.service_id)
    }

    /// Half-open overlap against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time && end > self.start_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "no_show" => Ok(AppointmentStatus::NoShow),
            other => Err(AppointmentError::Validation(format!(
                "Unknown appointment status: {}",
                other
            ))),
        }
    }
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub barber_id: Uuid,
    pub service: ServiceRef,
    /// Business local date-time.
    pub start_time: NaiveDateTime,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub start_time: NaiveDateTime,
    pub customer_phone: String,
    /// Moves the appointment to another barber when set.
    pub barber_id: Option<Uuid>,
    pub service: Option<ServiceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub customer_phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RescheduleOutcome {
    pub appointment: Appointment,
    pub cancelled_previous: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub barber_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub customer_phone: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AppointmentFilter {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.barber_id.map_or(true, |id| appointment.barber_id == id)
            && self.status.map_or(true, |s| appointment.status == s)
            && self
                .customer_phone
                .as_deref()
                .map_or(true, |p| appointment.customer_phone == p)
            && self.from.map_or(true, |from| appointment.start_time >= from)
            && self.to.map_or(true, |to| appointment.start_time < to)
    }
}

// ==============================================================================
// SLOTS, EVENTS AND STATS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub barber_id: Uuid,
    pub service_kind: ServiceKind,
    pub service_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityChanged {
    pub barber_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDistribution {
    pub labels: Vec<String>,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub labels: Vec<String>,
    pub appointments_data: Vec<u32>,
    pub revenue_data: Vec<f64>,
    pub service_distribution: ServiceDistribution,
    pub total_revenue: f64,
    pub count_today: u32,
    pub barber_count: usize,
}

// ==============================================================================
// PHONE NUMBERS
// ==============================================================================

/// Strips everything but digits and requires 10 to 15 of them.
pub fn normalize_phone(raw: &str) -> Result<String, AppointmentError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(10..=15).contains(&digits.len()) {
        return Err(AppointmentError::Validation(
            "Phone number must have between 10 and 15 digits".to_string(),
        ));
    }
    Ok(digits)
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Requested time conflicts with an existing appointment")]
    Conflict,

    #[error("Cannot change appointment from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Phone number does not match the appointment")]
    PhoneMismatch,

    #[error("Booking temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<BarberError> for AppointmentError {
    fn from(err: BarberError) -> Self {
        match err {
            BarberError::BarberNotFound => AppointmentError::NotFound("Barber"),
            BarberError::ServiceNotFound => AppointmentError::NotFound("Service"),
            BarberError::Validation(msg) => AppointmentError::Validation(msg),
            BarberError::Unavailable(msg) => AppointmentError::Unavailable(msg),
            BarberError::Database(msg) => AppointmentError::Database(msg),
        }
    }
}

impl From<AvailabilityError> for AppointmentError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Validation(msg) => AppointmentError::Validation(msg),
        }
    }
}

/// Missing rows come back as empty result sets, so a PostgREST 404 means
/// the table or route itself is missing and is reported as a database error.
impl From<DatabaseError> for AppointmentError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => AppointmentError::Conflict,
            other if other.is_transient() => AppointmentError::Unavailable(other.to_string()),
            other => AppointmentError::Database(other.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::NotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::Conflict => AppError::Conflict(err.to_string()),
            AppointmentError::InvalidStatusTransition { .. } => AppError::BadRequest(err.to_string()),
            AppointmentError::PhoneMismatch => AppError::Forbidden(err.to_string()),
            AppointmentError::Unavailable(msg) => AppError::Unavailable(msg),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
