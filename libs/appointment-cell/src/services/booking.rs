use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use barber_cell::services::{ensure_within_horizon, fits_schedule, CatalogService};
use shared_utils::clock::{BusinessTimezone, SharedClock};

use crate::models::{
    normalize_phone, Appointment, AppointmentError, AppointmentFilter, AppointmentStatus,
    BookAppointmentRequest, RescheduleOutcome, RescheduleRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::notifier::AvailabilityNotifier;
use crate::store::AppointmentStore;

#[derive(Clone)]
pub struct BookingService {
    catalog: CatalogService,
    appointments: Arc<dyn AppointmentStore>,
    notifier: AvailabilityNotifier,
    lifecycle: AppointmentLifecycleService,
    clock: SharedClock,
    timezone: BusinessTimezone,
}

impl BookingService {
    pub fn new(
        catalog: CatalogService,
        appointments: Arc<dyn AppointmentStore>,
        notifier: AvailabilityNotifier,
        clock: SharedClock,
        timezone: BusinessTimezone,
    ) -> Self {
        Self {
            catalog,
            appointments,
            notifier,
            lifecycle: AppointmentLifecycleService::new(),
            clock,
            timezone,
        }
    }

    /// Validates the request, then reserves the interval atomically.
    /// Overlap with a scheduled appointment of the same barber is a
    /// `Conflict`; nothing is retried.
    pub async fn book(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        debug!("Booking request for barber {} at {}", request.barber_id, request.start_time);

        let customer_name = request.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return Err(AppointmentError::Validation(
                "Customer name is required".to_string(),
            ));
        }
        let customer_phone = normalize_phone(&request.customer_phone)?;

        let barber = self.catalog.get_barber(request.barber_id).await?;
        if !barber.is_active {
            return Err(AppointmentError::Validation(
                "Barber is not taking appointments".to_string(),
            ));
        }

        let service = self
            .catalog
            .resolve_service(request.barber_id, request.service)
            .await?;

        let now = self.timezone.now_local(self.clock.as_ref());
        if request.start_time <= now {
            return Err(AppointmentError::Validation(
                "Appointment must start in the future".to_string(),
            ));
        }
        ensure_within_horizon(request.start_time.date(), now.date())?;

        let duration = i64::from(service.duration_minutes);
        let schedule = self
            .catalog
            .working_schedule_for(request.barber_id, request.start_time.date())
            .await?;
        if !fits_schedule(schedule.as_ref(), request.start_time, duration) {
            return Err(AppointmentError::Validation(
                "Requested time is outside the barber's working hours".to_string(),
            ));
        }

        let start_time = self.timezone.to_utc(request.start_time);
        let appointment = Appointment {
            id: Uuid::new_v4(),
            barber_id: request.barber_id,
            service_kind: service.service_ref.kind(),
            service_id: service.service_ref.id(),
            service_name: service.name.clone(),
            duration_minutes: service.duration_minutes,
            price: service.effective_price(),
            customer_name,
            customer_phone,
            customer_id: request.customer_id,
            start_time,
            end_time: start_time + Duration::minutes(duration),
            status: AppointmentStatus::Scheduled,
            created_at: self.clock.now(),
        };

        let appointment = match self.appointments.insert_if_free(appointment).await {
            Ok(appointment) => appointment,
            Err(AppointmentError::Conflict) => {
                warn!(
                    "Booking conflict for barber {} at {}",
                    request.barber_id, request.start_time
                );
                return Err(AppointmentError::Conflict);
            }
            Err(e) => return Err(e),
        };

        info!(
            "Appointment {} booked with barber {} at {}",
            appointment.id, appointment.barber_id, request.start_time
        );
        self.notifier
            .publish(appointment.barber_id, request.start_time.date());

        Ok(appointment)
    }

    /// Books the new time first and cancels the old appointment only when
    /// that succeeded. A failed cancel leaves both appointments in place and
    /// is reported through `cancelled_previous`.
    pub async fn reschedule(
        &self,
        appointment_id: Uuid,
        request: RescheduleRequest,
    ) -> Result<RescheduleOutcome, AppointmentError> {
        let current = self.get(appointment_id).await?;
        self.ensure_phone_matches(&current, &request.customer_phone)?;

        if self.lifecycle.is_terminal(current.status) {
            return Err(AppointmentError::InvalidStatusTransition {
                from: current.status,
                to: AppointmentStatus::Cancelled,
            });
        }
        if !self.lifecycle.can_customer_cancel(&current, self.clock.now()) {
            return Err(AppointmentError::Validation(
                "Appointment has already started".to_string(),
            ));
        }

        let replacement = self
            .book(BookAppointmentRequest {
                barber_id: request.barber_id.unwrap_or(current.barber_id),
                service: request.service.unwrap_or_else(|| current.service_ref()),
                start_time: request.start_time,
                customer_name: current.customer_name.clone(),
                customer_phone: current.customer_phone.clone(),
                customer_id: current.customer_id,
            })
            .await?;

        let cancelled_previous = match self
            .transition(&current, AppointmentStatus::Cancelled)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(
                    "Rescheduled {} to {} but could not cancel the original: {}",
                    current.id, replacement.id, e
                );
                false
            }
        };

        Ok(RescheduleOutcome {
            appointment: replacement,
            cancelled_previous,
        })
    }

    pub async fn cancel_by_customer(
        &self,
        appointment_id: Uuid,
        customer_phone: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get(appointment_id).await?;
        self.ensure_phone_matches(&appointment, customer_phone)?;

        if appointment.status == AppointmentStatus::Scheduled
            && !self.lifecycle.can_customer_cancel(&appointment, self.clock.now())
        {
            return Err(AppointmentError::Validation(
                "Appointment has already started".to_string(),
            ));
        }

        self.transition(&appointment, AppointmentStatus::Cancelled).await
    }

    pub async fn cancel_by_staff(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = self.get(appointment_id).await?;
        self.transition(&appointment, AppointmentStatus::Cancelled).await
    }

    pub async fn complete(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.close_out(appointment_id, AppointmentStatus::Completed).await
    }

    pub async fn mark_no_show(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.close_out(appointment_id, AppointmentStatus::NoShow).await
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound("Appointment"))
    }

    pub async fn list(&self, mut filter: AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        if let Some(phone) = filter.customer_phone.take() {
            filter.customer_phone = Some(normalize_phone(&phone)?);
        }
        self.appointments.list(&filter).await
    }

    async fn close_out(
        &self,
        appointment_id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get(appointment_id).await?;
        self.lifecycle.validate_status_transition(appointment.status, to)?;

        if !self.lifecycle.can_close_out(&appointment, self.clock.now()) {
            return Err(AppointmentError::Validation(
                "Appointment has not started yet".to_string(),
            ));
        }

        self.transition(&appointment, to).await
    }

    async fn transition(
        &self,
        appointment: &Appointment,
        to: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        self.lifecycle.validate_status_transition(appointment.status, to)?;

        let updated = self
            .appointments
            .update_status(appointment.id, appointment.status, to)
            .await?;

        let updated = match updated {
            Some(updated) => updated,
            None => {
                // Someone else moved it first; report against the fresh state.
                let fresh = self.get(appointment.id).await?;
                return Err(AppointmentError::InvalidStatusTransition {
                    from: fresh.status,
                    to,
                });
            }
        };

        info!("Appointment {} is now {}", updated.id, updated.status);
        self.notifier.publish(
            updated.barber_id,
            self.timezone.to_local(updated.start_time).date(),
        );

        Ok(updated)
    }

    fn ensure_phone_matches(&self, appointment: &Appointment, raw_phone: &str) -> Result<(), AppointmentError> {
        let phone = normalize_phone(raw_phone)?;
        if phone != appointment.customer_phone {
            debug!("Phone mismatch for appointment {}", appointment.id);
            return Err(AppointmentError::PhoneMismatch);
        }
        Ok(())
    }
}
