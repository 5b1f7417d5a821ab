use std::sync::Arc;

use barber_cell::services::CatalogService;
use barber_cell::store::CatalogStore;
use shared_config::AppConfig;
use shared_utils::clock::{BusinessTimezone, SharedClock};

use crate::services::{AvailabilityNotifier, BookingService, SlotService, StatsService};
use crate::store::AppointmentStore;

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub booking: BookingService,
    pub slots: SlotService,
    pub stats: StatsService,
    pub notifier: AvailabilityNotifier,
}

impl AppointmentState {
    pub fn new(
        config: Arc<AppConfig>,
        catalog_store: Arc<dyn CatalogStore>,
        appointment_store: Arc<dyn AppointmentStore>,
        clock: SharedClock,
        notifier: AvailabilityNotifier,
    ) -> Self {
        let catalog = CatalogService::new(catalog_store, clock.clone());
        let timezone = BusinessTimezone::from_offset_minutes(config.business_utc_offset_minutes);

        Self {
            booking: BookingService::new(
                catalog.clone(),
                appointment_store.clone(),
                notifier.clone(),
                clock.clone(),
                timezone,
            ),
            slots: SlotService::new(
                catalog.clone(),
                appointment_store.clone(),
                clock.clone(),
                timezone,
                i64::from(config.slot_step_minutes),
            ),
            stats: StatsService::new(catalog, appointment_store, clock, timezone),
            notifier,
            config,
        }
    }
}
