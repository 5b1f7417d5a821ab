pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentFilter, AppointmentStatus};

pub use memory::InMemoryAppointmentStore;
pub use supabase::SupabaseAppointmentStore;

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Scheduled appointments of `barber_id` overlapping `[from, to)`, by start.
    async fn list_scheduled(
        &self,
        barber_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppointmentError>;

    /// Inserts `appointment` unless it overlaps a scheduled appointment of the
    /// same barber. The check and the insert are one atomic unit.
    async fn insert_if_free(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Moves the appointment to `to` only while it is still in `from`.
    /// `None` when the row is missing or its status already changed.
    async fn update_status(
        &self,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppointmentError>;

    /// Newest first.
    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError>;
}
