use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use barber_cell::models::ServiceRef;
use barber_cell::services::{
    compute_slots, ensure_within_horizon, BookedInterval, CatalogService, SlotQuery,
};
use shared_utils::clock::{BusinessTimezone, SharedClock};

use crate::models::{Appointment, AppointmentError};
use crate::store::AppointmentStore;

/// Wires the pure slot computation to the catalog, the appointment store and
/// the clock.
#[derive(Clone)]
pub struct SlotService {
    catalog: CatalogService,
    appointments: Arc<dyn AppointmentStore>,
    clock: SharedClock,
    timezone: BusinessTimezone,
    step_minutes: i64,
}

impl SlotService {
    pub fn new(
        catalog: CatalogService,
        appointments: Arc<dyn AppointmentStore>,
        clock: SharedClock,
        timezone: BusinessTimezone,
        step_minutes: i64,
    ) -> Self {
        Self {
            catalog,
            appointments,
            clock,
            timezone,
            step_minutes,
        }
    }

    pub async fn available_slots(
        &self,
        barber_id: Uuid,
        date: NaiveDate,
        service_ref: ServiceRef,
    ) -> Result<Vec<NaiveTime>, AppointmentError> {
        let now = self.timezone.now_local(self.clock.as_ref());
        ensure_within_horizon(date, now.date())?;

        let barber = self.catalog.get_barber(barber_id).await?;
        if !barber.is_active {
            debug!("Barber {} is inactive, no slots", barber_id);
            return Ok(Vec::new());
        }

        let service = self.catalog.resolve_service(barber_id, service_ref).await?;
        let schedule = self.catalog.working_schedule_for(barber_id, date).await?;
        let booked = self.booked_intervals(barber_id, date).await?;

        let query = SlotQuery {
            barber_id,
            date,
            duration_minutes: i64::from(service.duration_minutes),
        };

        let slots = compute_slots(&query, schedule.as_ref(), &booked, self.step_minutes, now)?;
        debug!(
            "{} slots for barber {} on {} ({} booked)",
            slots.len(),
            barber_id,
            date,
            booked.len()
        );
        Ok(slots)
    }

    /// Scheduled appointments of the business day, as local intervals.
    pub async fn booked_intervals(
        &self,
        barber_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookedInterval>, AppointmentError> {
        let (from, to) = self.timezone.day_bounds(date);
        let scheduled = self.appointments.list_scheduled(barber_id, from, to).await?;
        Ok(to_local_intervals(&scheduled, &self.timezone))
    }
}

pub fn to_local_intervals(appointments: &[Appointment], timezone: &BusinessTimezone) -> Vec<BookedInterval> {
    appointments
        .iter()
        .map(|a| BookedInterval::new(timezone.to_local(a.start_time), timezone.to_local(a.end_time)))
        .collect()
}
