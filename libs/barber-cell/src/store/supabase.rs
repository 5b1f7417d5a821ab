use async_trait::async_trait;
use reqwest::{header::HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Barber, BarberError, BarberService, DayOfWeek, Service, WorkingSchedule};
use crate::store::CatalogStore;

pub struct SupabaseCatalogStore {
    supabase: SupabaseClient,
}

impl SupabaseCatalogStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn with_client(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, BarberError> {
        let rows: Vec<T> = self.supabase.request(Method::GET, path, None).await?;
        Ok(rows)
    }

    async fn fetch_one<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, BarberError> {
        Ok(self.fetch(path).await?.into_iter().next())
    }

    async fn write<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Value,
    ) -> Result<Option<T>, BarberError> {
        let rows: Vec<T> = self
            .supabase
            .request_with_headers(
                method,
                path,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, path: &str) -> Result<bool, BarberError> {
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                path,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl CatalogStore for SupabaseCatalogStore {
    async fn list_barbers(&self, only_active: bool) -> Result<Vec<Barber>, BarberError> {
        let path = if only_active {
            "/rest/v1/barbers?is_active=eq.true&order=name.asc"
        } else {
            "/rest/v1/barbers?order=name.asc"
        };
        self.fetch(path).await
    }

    async fn get_barber(&self, barber_id: Uuid) -> Result<Option<Barber>, BarberError> {
        self.fetch_one(&format!("/rest/v1/barbers?id=eq.{}", barber_id)).await
    }

    async fn insert_barber(&self, barber: Barber) -> Result<Barber, BarberError> {
        debug!("Inserting barber {}", barber.id);
        self.write(Method::POST, "/rest/v1/barbers", json!(barber))
            .await?
            .ok_or_else(|| BarberError::Database("Failed to create barber".to_string()))
    }

    async fn update_barber(&self, barber: Barber) -> Result<Barber, BarberError> {
        let path = format!("/rest/v1/barbers?id=eq.{}", barber.id);
        self.write(Method::PATCH, &path, json!(barber))
            .await?
            .ok_or(BarberError::BarberNotFound)
    }

    async fn list_services(&self) -> Result<Vec<Service>, BarberError> {
        self.fetch("/rest/v1/services?order=name.asc").await
    }

    async fn get_service(&self, service_id: Uuid) -> Result<Option<Service>, BarberError> {
        self.fetch_one(&format!("/rest/v1/services?id=eq.{}", service_id)).await
    }

    async fn insert_service(&self, service: Service) -> Result<Service, BarberError> {
        self.write(Method::POST, "/rest/v1/services", json!(service))
            .await?
            .ok_or_else(|| BarberError::Database("Failed to create service".to_string()))
    }

    async fn delete_service(&self, service_id: Uuid) -> Result<bool, BarberError> {
        self.delete(&format!("/rest/v1/services?id=eq.{}", service_id)).await
    }

    async fn list_barber_services(&self, barber_id: Uuid) -> Result<Vec<BarberService>, BarberError> {
        self.fetch(&format!(
            "/rest/v1/barber_services?barber_id=eq.{}&order=name.asc",
            barber_id
        ))
        .await
    }

    async fn get_barber_service(&self, service_id: Uuid) -> Result<Option<BarberService>, BarberError> {
        self.fetch_one(&format!("/rest/v1/barber_services?id=eq.{}", service_id))
            .await
    }

    async fn insert_barber_service(&self, service: BarberService) -> Result<BarberService, BarberError> {
        self.write(Method::POST, "/rest/v1/barber_services", json!(service))
            .await?
            .ok_or_else(|| BarberError::Database("Failed to create barber service".to_string()))
    }

    async fn update_barber_service(&self, service: BarberService) -> Result<BarberService, BarberError> {
        let path = format!("/rest/v1/barber_services?id=eq.{}", service.id);
        self.write(Method::PATCH, &path, json!(service))
            .await?
            .ok_or(BarberError::ServiceNotFound)
    }

    async fn delete_barber_service(&self, service_id: Uuid) -> Result<bool, BarberError> {
        self.delete(&format!("/rest/v1/barber_services?id=eq.{}", service_id))
            .await
    }

    async fn working_schedule(
        &self,
        barber_id: Uuid,
        day: DayOfWeek,
    ) -> Result<Option<WorkingSchedule>, BarberError> {
        self.fetch_one(&format!(
            "/rest/v1/working_schedules?barber_id=eq.{}&day_of_week=eq.{}",
            barber_id, day
        ))
        .await
    }

    async fn list_working_schedule(&self, barber_id: Uuid) -> Result<Vec<WorkingSchedule>, BarberError> {
        let mut entries: Vec<WorkingSchedule> = self
            .fetch(&format!("/rest/v1/working_schedules?barber_id=eq.{}", barber_id))
            .await?;
        entries.sort_by_key(|s| s.day_of_week);
        Ok(entries)
    }

    async fn upsert_working_schedule(
        &self,
        schedule: WorkingSchedule,
    ) -> Result<WorkingSchedule, BarberError> {
        let mut headers = SupabaseClient::return_representation();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let rows: Vec<WorkingSchedule> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/working_schedules?on_conflict=barber_id,day_of_week",
                Some(json!(schedule)),
                Some(headers),
            )
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| BarberError::Database("Failed to save working schedule".to_string()))
    }
}
