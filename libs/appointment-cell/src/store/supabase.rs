use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Appointment, AppointmentError, AppointmentFilter, AppointmentStatus};
use crate::store::AppointmentStore;

/// PostgREST-backed appointments.
///
/// Double-booking is prevented by the database: the `appointments` table
/// carries an exclusion constraint over `(barber_id, tstzrange(start_time,
/// end_time))` restricted to `status = 'scheduled'`, and PostgREST reports a
/// violation as 409. The table and constraint are created by
/// `migrations/0001_barbershop_schema.sql`.
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub fn with_client(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn filter_query(filter: &AppointmentFilter) -> String {
    let mut params = Vec::new();

    if let Some(barber_id) = filter.barber_id {
        params.push(format!("barber_id=eq.{}", barber_id));
    }
    if let Some(status) = filter.status {
        params.push(format!("status=eq.{}", status));
    }
    if let Some(phone) = &filter.customer_phone {
        params.push(format!("customer_phone=eq.{}", phone));
    }
    if let Some(from) = filter.from {
        params.push(format!("start_time=gte.{}", timestamp(from)));
    }
    if let Some(to) = filter.to {
        params.push(format!("start_time=lt.{}", timestamp(to)));
    }
    params.push("order=start_time.desc".to_string());
    params.push(format!(
        "limit={}",
        filter.limit.unwrap_or(AppointmentFilter::DEFAULT_LIMIT)
    ));
    if let Some(offset) = filter.offset {
        params.push(format!("offset={}", offset));
    }

    params.join("&")
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn list_scheduled(
        &self,
        barber_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?barber_id=eq.{}&status=eq.scheduled&start_time=lt.{}&end_time=gt.{}&order=start_time.asc",
            barber_id,
            timestamp(to),
            timestamp(from)
        );
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows)
    }

    async fn insert_if_free(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        debug!("Inserting appointment {} for barber {}", appointment.id, appointment.barber_id);

        let result: Result<Vec<Appointment>, _> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(json!(appointment)),
                Some(SupabaseClient::return_representation()),
            )
            .await;

        let rows = result.map_err(|e| {
            let err = AppointmentError::from(e);
            if matches!(err, AppointmentError::Conflict) {
                warn!("Exclusion constraint rejected appointment for barber {}", appointment.barber_id);
            }
            err
        })?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("Insert returned no rows".to_string()))
    }

    async fn get(&self, appointment_id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_status(
        &self,
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&status=eq.{}",
            appointment_id, from
        );
        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "status": to })),
                Some(SupabaseClient::return_representation()),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?{}", filter_query(filter));
        let rows: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows)
    }
}
