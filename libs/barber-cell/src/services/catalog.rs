use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Barber, BarberError, BarberService, CreateBarberRequest, CreateServiceRequest, DayOfWeek,
    ResolvedService, Service, ServiceRef, UpdateBarberRequest, UpdateServiceRequest,
    UpsertScheduleRequest, WorkingSchedule,
};
use crate::store::CatalogStore;
use shared_utils::clock::SharedClock;

/// Barbers, their services and their weekly schedule.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    clock: SharedClock,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    // ==========================================================================
    // BARBERS
    // ==========================================================================

    pub async fn list_barbers(&self, only_active: bool) -> Result<Vec<Barber>, BarberError> {
        self.store.list_barbers(only_active).await
    }

    pub async fn get_barber(&self, barber_id: Uuid) -> Result<Barber, BarberError> {
        self.store
            .get_barber(barber_id)
            .await?
            .ok_or(BarberError::BarberNotFound)
    }

    /// Like `get_barber`, but inactive barbers are reported as missing.
    pub async fn get_active_barber(&self, barber_id: Uuid) -> Result<Barber, BarberError> {
        let barber = self.get_barber(barber_id).await?;
        if !barber.is_active {
            debug!("Barber {} is inactive", barber_id);
            return Err(BarberError::BarberNotFound);
        }
        Ok(barber)
    }

    pub async fn create_barber(&self, request: CreateBarberRequest) -> Result<Barber, BarberError> {
        let name = require_name(&request.name)?;

        let barber = Barber {
            id: Uuid::new_v4(),
            name,
            bio: request.bio,
            photo_url: request.photo_url,
            is_active: request.is_active.unwrap_or(true),
            created_at: self.clock.now(),
        };

        let barber = self.store.insert_barber(barber).await?;
        info!("Barber created: {} ({})", barber.name, barber.id);
        Ok(barber)
    }

    pub async fn update_barber(
        &self,
        barber_id: Uuid,
        request: UpdateBarberRequest,
    ) -> Result<Barber, BarberError> {
        let mut barber = self.get_barber(barber_id).await?;

        if let Some(name) = request.name {
            barber.name = require_name(&name)?;
        }
        if let Some(bio) = request.bio {
            barber.bio = Some(bio);
        }
        if let Some(photo_url) = request.photo_url {
            barber.photo_url = Some(photo_url);
        }
        if let Some(is_active) = request.is_active {
            barber.is_active = is_active;
        }

        self.store.update_barber(barber).await
    }

    // ==========================================================================
    // SERVICES
    // ==========================================================================

    pub async fn list_services(&self) -> Result<Vec<Service>, BarberError> {
        self.store.list_services().await
    }

    pub async fn create_service(&self, request: CreateServiceRequest) -> Result<Service, BarberError> {
        let name = require_name(&request.name)?;
        validate_offer(request.duration_minutes, request.price, request.discount_price)?;

        let service = Service {
            id: Uuid::new_v4(),
            name,
            duration_minutes: request.duration_minutes,
            price: request.price,
            discount_price: request.discount_price,
        };

        let service = self.store.insert_service(service).await?;
        info!("Service created: {} ({})", service.name, service.id);
        Ok(service)
    }

    pub async fn delete_service(&self, service_id: Uuid) -> Result<(), BarberError> {
        if !self.store.delete_service(service_id).await? {
            return Err(BarberError::ServiceNotFound);
        }
        Ok(())
    }

    pub async fn list_barber_services(&self, barber_id: Uuid) -> Result<Vec<BarberService>, BarberError> {
        self.get_barber(barber_id).await?;
        self.store.list_barber_services(barber_id).await
    }

    pub async fn create_barber_service(
        &self,
        barber_id: Uuid,
        request: CreateServiceRequest,
    ) -> Result<BarberService, BarberError> {
        self.get_barber(barber_id).await?;
        let name = require_name(&request.name)?;
        validate_offer(request.duration_minutes, request.price, request.discount_price)?;

        let service = BarberService {
            id: Uuid::new_v4(),
            barber_id,
            name,
            duration_minutes: request.duration_minutes,
            price: request.price,
            discount_price: request.discount_price,
        };

        self.store.insert_barber_service(service).await
    }

    pub async fn update_barber_service(
        &self,
        barber_id: Uuid,
        service_id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<BarberService, BarberError> {
        let mut service = self.owned_barber_service(barber_id, service_id).await?;

        if let Some(name) = request.name {
            service.name = require_name(&name)?;
        }
        if let Some(duration) = request.duration_minutes {
            service.duration_minutes = duration;
        }
        if let Some(price) = request.price {
            service.price = price;
        }
        if let Some(discount) = request.discount_price {
            service.discount_price = discount;
        }
        validate_offer(service.duration_minutes, service.price, service.discount_price)?;

        self.store.update_barber_service(service).await
    }

    pub async fn delete_barber_service(&self, barber_id: Uuid, service_id: Uuid) -> Result<(), BarberError> {
        self.owned_barber_service(barber_id, service_id).await?;
        if !self.store.delete_barber_service(service_id).await? {
            return Err(BarberError::ServiceNotFound);
        }
        Ok(())
    }

    async fn owned_barber_service(
        &self,
        barber_id: Uuid,
        service_id: Uuid,
    ) -> Result<BarberService, BarberError> {
        self.store
            .get_barber_service(service_id)
            .await?
            .filter(|s| s.barber_id == barber_id)
            .ok_or(BarberError::ServiceNotFound)
    }

    /// Resolves what `service_ref` means for `barber_id`. A barber-service
    /// reference owned by another barber does not resolve.
    pub async fn resolve_service(
        &self,
        barber_id: Uuid,
        service_ref: ServiceRef,
    ) -> Result<ResolvedService, BarberError> {
        let resolved = match service_ref {
            ServiceRef::Global(id) => self
                .store
                .get_service(id)
                .await?
                .map(|s| ResolvedService::from(&s)),
            ServiceRef::ProfessionalOverride(id) => self
                .store
                .get_barber_service(id)
                .await?
                .filter(|s| s.barber_id == barber_id)
                .map(|s| ResolvedService::from(&s)),
        };

        let resolved = resolved.ok_or(BarberError::ServiceNotFound)?;
        if resolved.duration_minutes <= 0 {
            warn!("Service {} has non-positive duration", service_ref.id());
            return Err(BarberError::Validation(
                "Service duration must be positive".to_string(),
            ));
        }
        Ok(resolved)
    }

    // ==========================================================================
    // WORKING SCHEDULE
    // ==========================================================================

    pub async fn list_working_schedule(&self, barber_id: Uuid) -> Result<Vec<WorkingSchedule>, BarberError> {
        self.get_barber(barber_id).await?;
        self.store.list_working_schedule(barber_id).await
    }

    /// Schedule entry for the weekday of `date`, if any.
    pub async fn working_schedule_for(
        &self,
        barber_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<WorkingSchedule>, BarberError> {
        self.store
            .working_schedule(barber_id, DayOfWeek::from(date.weekday()))
            .await
    }

    pub async fn upsert_working_schedule(
        &self,
        barber_id: Uuid,
        day_of_week: DayOfWeek,
        request: UpsertScheduleRequest,
    ) -> Result<WorkingSchedule, BarberError> {
        self.get_barber(barber_id).await?;

        if request.is_active && request.start_time >= request.end_time {
            return Err(BarberError::Validation(
                "Opening time must be before closing time".to_string(),
            ));
        }

        let schedule = WorkingSchedule {
            barber_id,
            day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            is_active: request.is_active,
        };

        let schedule = self.store.upsert_working_schedule(schedule).await?;
        info!("Working schedule set for barber {} on {}", barber_id, day_of_week);
        Ok(schedule)
    }
}

fn require_name(name: &str) -> Result<String, BarberError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(BarberError::Validation("Name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_offer(duration_minutes: i32, price: f64, discount_price: Option<f64>) -> Result<(), BarberError> {
    if duration_minutes <= 0 {
        return Err(BarberError::Validation(
            "Duration must be greater than zero".to_string(),
        ));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(BarberError::Validation("Price must be zero or more".to_string()));
    }
    if let Some(discount) = discount_price {
        if !discount.is_finite() || discount < 0.0 || discount >= price {
            return Err(BarberError::Validation(
                "Discount price must be below the regular price".to_string(),
            ));
        }
    }
    Ok(())
}
