//! Persistence seam for the catalog. The in-memory store backs local runs
//! and tests; the Supabase store talks to PostgREST.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Barber, BarberError, BarberService, DayOfWeek, Service, WorkingSchedule};

pub use memory::InMemoryCatalogStore;
pub use supabase::SupabaseCatalogStore;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_barbers(&self, only_active: bool) -> Result<Vec<Barber>, BarberError>;
    async fn get_barber(&self, barber_id: Uuid) -> Result<Option<Barber>, BarberError>;
    async fn insert_barber(&self, barber: Barber) -> Result<Barber, BarberError>;
    async fn update_barber(&self, barber: Barber) -> Result<Barber, BarberError>;

    async fn list_services(&self) -> Result<Vec<Service>, BarberError>;
    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, BarberError>;
    async fn insert_service(&self, service: Service) -> Result<Service, BarberError>;
    async fn delete_service(&self, service_id: Uuid) -> Result<bool, BarberError>;

    async fn list_barber_services(&self, barber_id: Uuid) -> Result<Vec<BarberService>, BarberError>;
    async fn get_barber_service(&self, service_id: Uuid) -> Result<Option<BarberService>, BarberError>;
    async fn insert_barber_service(&self, service: BarberService) -> Result<BarberService, BarberError>;
    async fn update_barber_service(&self, service: BarberService) -> Result<BarberService, BarberError>;
    async fn delete_barber_service(&self, service_id: Uuid) -> Result<bool, BarberError>;

    async fn working_schedule(
        &self,
        barber_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Option<WorkingSchedule>, BarberError>;
    async fn list_working_schedule(&self, barber_id: Uuid) -> Result<Vec<WorkingSchedule>, BarberError>;
    async fn upsert_working_schedule(
        &self,
        schedule: WorkingSchedule,
    ) -> Result<WorkingSchedule, BarberError>;
}
