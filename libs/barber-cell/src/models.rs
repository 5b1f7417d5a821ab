use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DatabaseError;
use shared_models::error::AppError;
use shared_utils::serde_time::hhmm;

// ==============================================================================
// BARBERS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barber {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBarberRequest {
    pub name: String,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBarberRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub is_active: Option<bool>,
}

// ==============================================================================
// WORKING SCHEDULE
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = BarberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str() == wanted || day.as_str()[..3] == wanted)
            .ok_or_else(|| BarberError::Validation(format!("Unknown day of week: {}", s)))
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A barber's opening window for one day of the week. A day without an
/// entry, or with an inactive one, is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingSchedule {
    pub barber_id: Uuid,
    pub day_of_week: DayOfWeek,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl WorkingSchedule {
    pub fn is_open(&self) -> bool {
        self.is_active && self.start_time < self.end_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertScheduleRequest {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

// ==============================================================================
// SERVICES
// ==============================================================================

/// Shop-wide service offered by every barber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub discount_price: Option<f64>,
}

/// Service owned by one barber, with its own price and duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarberService {
    pub id: Uuid,
    pub barber_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub discount_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub discount_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<f64>,
    /// `Some(None)` clears the discount.
    #[serde(default, with = "double_option")]
    pub discount_price: Option<Option<f64>>,
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<Option<f64>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Global,
    BarberService,
}

/// Reference to the service being booked: either a shop-wide service or a
/// barber's own override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ServiceRef {
    Global(Uuid),
    #[serde(rename = "barber_service")]
    ProfessionalOverride(Uuid),
}

impl ServiceRef {
    pub fn from_parts(kind: ServiceKind, id: Uuid) -> Self {
        match kind {
            ServiceKind::Global => ServiceRef::Global(id),
            ServiceKind::BarberService => ServiceRef::ProfessionalOverride(id),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceRef::Global(_) => ServiceKind::Global,
            ServiceRef::ProfessionalOverride(_) => ServiceKind::BarberService,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ServiceRef::Global(id) | ServiceRef::ProfessionalOverride(id) => *id,
        }
    }
}

/// What a `ServiceRef` means for one barber at booking time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedService {
    pub service_ref: ServiceRef,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub discount_price: Option<f64>,
}

impl ResolvedService {
    /// Price actually charged: the discount when one is set.
    pub fn effective_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.price)
    }
}

impl From<&Service> for ResolvedService {
    fn from(service: &Service) -> Self {
        Self {
            service_ref: ServiceRef::Global(service.id),
            name: service.name.clone(),
            duration_minutes: service.duration_minutes,
            price: service.price,
            discount_price: service.discount_price,
        }
    }
}

impl From<&BarberService> for ResolvedService {
    fn from(service: &BarberService) -> Self {
        Self {
            service_ref: ServiceRef::ProfessionalOverride(service.id),
            name: service.name.clone(),
            duration_minutes: service.duration_minutes,
            price: service.price,
            discount_price: service.discount_price,
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum BarberError {
    #[error("Barber not found")]
    BarberNotFound,

    #[error("Service not found")]
    ServiceNotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DatabaseError> for BarberError {
    fn from(err: DatabaseError) -> Self {
        if err.is_transient() {
            BarberError::Unavailable(err.to_string())
        } else {
            BarberError::Database(err.to_string())
        }
    }
}

impl From<BarberError> for AppError {
    fn from(err: BarberError) -> Self {
        match err {
            BarberError::BarberNotFound | BarberError::ServiceNotFound => {
                AppError::NotFound(err.to_string())
            }
            BarberError::Validation(msg) => AppError::ValidationError(msg),
            BarberError::Unavailable(msg) => AppError::Unavailable(msg),
            BarberError::Database(msg) => AppError::Database(msg),
        }
    }
}
