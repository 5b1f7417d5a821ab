#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus, BookAppointmentRequest};
use appointment_cell::services::AvailabilityNotifier;
use appointment_cell::state::AppointmentState;
use appointment_cell::store::InMemoryAppointmentStore;
use barber_cell::models::{
    Barber, BarberService, CreateBarberRequest, CreateServiceRequest, DayOfWeek, Service,
    ServiceKind, ServiceRef, UpsertScheduleRequest,
};
use barber_cell::services::CatalogService;
use barber_cell::store::InMemoryCatalogStore;
use shared_utils::clock::{FixedClock, SharedClock};
use shared_utils::test_utils::TestConfig;

pub const PHONE: &str = "(11) 98765-4321";
pub const PHONE_DIGITS: &str = "11987654321";

/// 2030-01-07 is a Monday. Test config runs the shop in UTC.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
}

pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 8).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn local(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_time(hm(h, m))
}

pub fn instant(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&local(date, h, m))
}

/// The Sunday before `monday()`, at noon.
pub fn sunday_noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 6, 12, 0, 0).unwrap()
}

pub struct Fixture {
    pub state: AppointmentState,
    pub catalog: CatalogService,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub barber: Barber,
    /// Barber's own 30 minute cut, 50.00 discounted to 45.00.
    pub haircut: BarberService,
    /// Shop-wide 45 minute service at 30.00.
    pub beard: Service,
}

impl Fixture {
    pub async fn at(now: DateTime<Utc>) -> Self {
        let config = TestConfig::default().to_arc();
        let catalog_store = Arc::new(InMemoryCatalogStore::new());
        let clock: SharedClock = Arc::new(FixedClock(now));
        let catalog = CatalogService::new(catalog_store.clone(), clock.clone());
        let appointments = Arc::new(InMemoryAppointmentStore::new(Duration::from_millis(
            config.booking_lock_timeout_ms,
        )));

        let barber = catalog
            .create_barber(CreateBarberRequest {
                name: "Ana".to_string(),
                bio: None,
                photo_url: None,
                is_active: Some(true),
            })
            .await
            .unwrap();

        // Monday 09:00-12:00, Tuesday 09:00-10:00.
        for (day, end) in [(DayOfWeek::Monday, hm(12, 0)), (DayOfWeek::Tuesday, hm(10, 0))] {
            catalog
                .upsert_working_schedule(
                    barber.id,
                    day,
                    UpsertScheduleRequest {
                        start_time: hm(9, 0),
                        end_time: end,
                        is_active: true,
                    },
                )
                .await
                .unwrap();
        }

        let haircut = catalog
            .create_barber_service(
                barber.id,
                CreateServiceRequest {
                    name: "Corte".to_string(),
                    duration_minutes: 30,
                    price: 50.0,
                    discount_price: Some(45.0),
                },
            )
            .await
            .unwrap();

        let beard = catalog
            .create_service(CreateServiceRequest {
                name: "Barba".to_string(),
                duration_minutes: 45,
                price: 30.0,
                discount_price: None,
            })
            .await
            .unwrap();

        let state = AppointmentState::new(
            config,
            catalog_store,
            appointments.clone(),
            clock,
            AvailabilityNotifier::default(),
        );

        Self {
            state,
            catalog,
            appointments,
            barber,
            haircut,
            beard,
        }
    }

    pub fn haircut_ref(&self) -> ServiceRef {
        ServiceRef::ProfessionalOverride(self.haircut.id)
    }

    pub fn beard_ref(&self) -> ServiceRef {
        ServiceRef::Global(self.beard.id)
    }

    pub fn haircut_at(&self, start: NaiveDateTime) -> BookAppointmentRequest {
        BookAppointmentRequest {
            barber_id: self.barber.id,
            service: self.haircut_ref(),
            start_time: start,
            customer_name: "João Silva".to_string(),
            customer_phone: PHONE.to_string(),
            customer_id: None,
        }
    }

    /// A stored appointment, bypassing booking rules.
    pub fn stored(&self, start: DateTime<Utc>, status: AppointmentStatus, name: &str, price: f64) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            barber_id: self.barber.id,
            service_kind: ServiceKind::Global,
            service_id: self.beard.id,
            service_name: name.to_string(),
            duration_minutes: 30,
            price,
            customer_name: "Cliente".to_string(),
            customer_phone: PHONE_DIGITS.to_string(),
            customer_id: None,
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            status,
            created_at: start,
        }
    }
}
