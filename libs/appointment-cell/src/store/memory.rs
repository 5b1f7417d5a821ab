use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentFilter, AppointmentStatus};
use crate::store::AppointmentStore;

pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    barber_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
    lock_timeout: Duration,
}

impl InMemoryAppointmentStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            appointments: RwLock::new(HashMap::new()),
            barber_locks: Mutex::new(HashMap::new()),
            lock_timeout,
        }
    }

    /// Commit guard for one barber. Guards of different barbers are
    /// independent.
    async fn lock_barber(&self, barber_id: Uuid) -> Result<OwnedMutexGuard<()>, AppointmentError> {
        let lock = {
            let mut locks = self.barber_locks.lock().await;
            locks.entry(barber_id).or_default().clone()
        };

        tokio::time::timeout(self.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                warn!("Timed out waiting for booking guard of barber {}", barber_id);
                AppointmentError::Unavailable("Booking is busy, please try again".to_string())
            })
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn list_scheduled(
        &self,
        barber_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.appointments.read().await;
        let mut scheduled: Vec<Appointment> = appointments
            .values()
            .filter(|a| {
                a.barber_id == barber_id
                    && a.status == AppointmentStatus::Scheduled
                    && a.overlaps(from, to)
            })
            .cloned()
            .collect();
        scheduled.sort_by_key(|a| a.start_time);
        Ok(scheduled)
    }

    async fn insert_if_free(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        let _guard = self.lock_barber(appointment.barber_id).await?;

        let clashes = self
            .list_scheduled(appointment.barber_id, appointment.start_time, appointment.end_time)
            .await?;
        if !clashes.is_empty() {
            debug!(
                "Appointment for barber {} at {} clashes with {} existing",
                appointment.barber_id,
                appointment.start_time,
                clashes.len()
            );
            return Err(AppointmentError::Conflict);
        }

        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.appointments.read().await.get(&appointment_id).cloned())
    }

    async fn update_status(
        &self,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let mut appointments = self.appointments.write().await;
        Ok(appointments
            .get_mut(&appointment_id)
            .filter(|a| a.status == from)
            .map(|a| {
                a.status = to;
                a.clone()
            }))
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        let appointments = self.appointments.read().await;
        let mut matching: Vec<Appointment> = appointments
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        Ok(matching
            .into_iter()
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(AppointmentFilter::DEFAULT_LIMIT))
            .collect())
    }
}
