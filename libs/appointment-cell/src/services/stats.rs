use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use barber_cell::services::CatalogService;
use shared_utils::clock::{BusinessTimezone, SharedClock};

use crate::models::{
    AppointmentError, AppointmentFilter, AppointmentStatus, DashboardStats, ServiceDistribution,
};
use crate::store::AppointmentStore;

const WINDOW_DAYS: i64 = 7;
const TOP_SERVICES: usize = 5;
const MAX_ROWS: usize = 10_000;

#[derive(Clone)]
pub struct StatsService {
    catalog: CatalogService,
    appointments: Arc<dyn AppointmentStore>,
    clock: SharedClock,
    timezone: BusinessTimezone,
}

impl StatsService {
    pub fn new(
        catalog: CatalogService,
        appointments: Arc<dyn AppointmentStore>,
        clock: SharedClock,
        timezone: BusinessTimezone,
    ) -> Self {
        Self {
            catalog,
            appointments,
            clock,
            timezone,
        }
    }

    /// Counts and revenue for the last seven business days, today included.
    /// Cancelled appointments are left out.
    pub async fn dashboard(&self) -> Result<DashboardStats, AppointmentError> {
        let today = self.timezone.today(self.clock.as_ref());
        let first_day = today - Duration::days(WINDOW_DAYS - 1);
        let (from, _) = self.timezone.day_bounds(first_day);
        let (_, to) = self.timezone.day_bounds(today);

        let appointments = self
            .appointments
            .list(&AppointmentFilter {
                from: Some(from),
                to: Some(to),
                limit: Some(MAX_ROWS),
                ..Default::default()
            })
            .await?;
        debug!("Building dashboard from {} appointments", appointments.len());

        let days: Vec<_> = (0..WINDOW_DAYS)
            .map(|offset| first_day + Duration::days(offset))
            .collect();
        let mut stats = DashboardStats {
            labels: days.iter().map(|d| d.format("%d/%m").to_string()).collect(),
            appointments_data: vec![0; days.len()],
            revenue_data: vec![0.0; days.len()],
            barber_count: self.catalog.list_barbers(true).await?.len(),
            ..Default::default()
        };

        let mut service_counts: HashMap<String, u32> = HashMap::new();
        for appointment in appointments
            .iter()
            .filter(|a| a.status != AppointmentStatus::Cancelled)
        {
            let day = self.timezone.to_local(appointment.start_time).date();
            let Some(index) = days.iter().position(|d| *d == day) else {
                continue;
            };

            stats.appointments_data[index] += 1;
            stats.revenue_data[index] += appointment.price;
            stats.total_revenue += appointment.price;
            if day == today {
                stats.count_today += 1;
            }
            *service_counts
                .entry(appointment.service_name.clone())
                .or_default() += 1;
        }

        let mut ranked: Vec<(String, u32)> = service_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(TOP_SERVICES);
        stats.service_distribution = ServiceDistribution {
            labels: ranked.iter().map(|(name, _)| name.clone()).collect(),
            data: ranked.iter().map(|(_, count)| *count).collect(),
        };

        Ok(stats)
    }
}
