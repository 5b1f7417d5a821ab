use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Barber, BarberError, BarberService, DayOfWeek, Service, WorkingSchedule};
use crate::store::CatalogStore;

#[derive(Default)]
struct Catalog {
    barbers: HashMap<Uuid, Barber>,
    services: HashMap<Uuid, Service>,
    barber_services: HashMap<Uuid, BarberService>,
    schedules: HashMap<(Uuid, DayOfWeek), WorkingSchedule>,
}

#[derive(Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Catalog>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_barbers(&self, only_active: bool) -> Result<Vec<Barber>, BarberError> {
        let catalog = self.inner.read().await;
        let mut barbers: Vec<Barber> = catalog
            .barbers
            .values()
            .filter(|b| !only_active || b.is_active)
            .cloned()
            .collect();
        barbers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(barbers)
    }

    async fn get_barber(&self, barber_id: Uuid) -> Result<Option<Barber>, BarberError> {
        Ok(self.inner.read().await.barbers.get(&barber_id).cloned())
    }

    async fn insert_barber(&self, barber: Barber) -> Result<Barber, BarberError> {
        self.inner.write().await.barbers.insert(barber.id, barber.clone());
        Ok(barber)
    }

    async fn update_barber(&self, barber: Barber) -> Result<Barber, BarberError> {
        let mut catalog = self.inner.write().await;
        match catalog.barbers.get_mut(&barber.id) {
            Some(existing) => {
                *existing = barber.clone();
                Ok(barber)
            }
            None => Err(BarberError::BarberNotFound),
        }
    }

    async fn list_services(&self) -> Result<Vec<Service>, BarberError> {
        let catalog = self.inner.read().await;
        let mut services: Vec<Service> = catalog.services.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, BarberError> {
        Ok(self.inner.read().await.services.get(&service_id).cloned())
    }

    async fn insert_service(&self, service: Service) -> Result<Service, BarberError> {
        self.inner.write().await.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn delete_service(&self, service_id: Uuid) -> Result<bool, BarberError> {
        Ok(self.inner.write().await.services.remove(&service_id).is_some())
    }

    async fn list_barber_services(&self, barber_id: Uuid) -> Result<Vec<BarberService>, BarberError> {
        let catalog = self.inner.read().await;
        let mut services: Vec<BarberService> = catalog
            .barber_services
            .values()
            .filter(|s| s.barber_id == barber_id)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_barber_service(&self, service_id: Uuid) -> Result<Option<BarberService>, BarberError> {
        Ok(self.inner.read().await.barber_services.get(&service_id).cloned())
    }

    async fn insert_barber_service(&self, service: BarberService) -> Result<BarberService, BarberError> {
        self.inner
            .write()
            .await
            .barber_services
            .insert(service.id, service.clone());
        Ok(service)
    }

    async fn update_barber_service(&self, service: BarberService) -> Result<BarberService, BarberError> {
        let mut catalog = self.inner.write().await;
        match catalog.barber_services.get_mut(&service.id) {
            Some(existing) => {
                *existing = service.clone();
                Ok(service)
            }
            None => Err(BarberError::ServiceNotFound),
        }
    }

    async fn delete_barber_service(&self, service_id: Uuid) -> Result<bool, BarberError> {
        Ok(self
            .inner
            .write()
            .await
            .barber_services
            .remove(&service_id)
            .is_some())
    }

    async fn working_schedule(
        &self,
        barber_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Option<WorkingSchedule>, BarberError> {
        Ok(self.inner.read().await.schedules.get(&(barber_id, day)).cloned())
    }

    async fn list_working_schedule(&self, barber_id: Uuid) -> Result<Vec<WorkingSchedule>, BarberError> {
        let catalog = self.inner.read().await;
        let mut entries: Vec<WorkingSchedule> = catalog
            .schedules
            .values()
            .filter(|s| s.barber_id == barber_id)
            .cloned()
            .collect();
        entries.sort_by_key(|s| s.day_of_week);
        Ok(entries)
    }

    async fn upsert_working_schedule(
        &self,
        schedule: WorkingSchedule,
    ) -> Result<WorkingSchedule, BarberError> {
        self.inner
            .write()
            .await
            .schedules
            .insert((schedule.barber_id, schedule.day_of_week), schedule.clone());
        Ok(schedule)
    }
}
