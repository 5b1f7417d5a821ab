use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::AvailabilityNotifier;
use appointment_cell::state::AppointmentState;
use appointment_cell::store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
use barber_cell::state::CatalogState;
use barber_cell::store::{CatalogStore, InMemoryCatalogStore, SupabaseCatalogStore};
use shared_config::{AppConfig, StorageBackend};
use shared_utils::clock::{SharedClock, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Barbershop API server");

    let config = Arc::new(AppConfig::from_env());

    let (catalog_store, appointment_store): (Arc<dyn CatalogStore>, Arc<dyn AppointmentStore>) =
        match config.storage_backend {
            StorageBackend::Memory => (
                Arc::new(InMemoryCatalogStore::new()),
                Arc::new(InMemoryAppointmentStore::new(Duration::from_millis(
                    config.booking_lock_timeout_ms,
                ))),
            ),
            StorageBackend::Supabase => (
                Arc::new(SupabaseCatalogStore::new(&config)),
                Arc::new(SupabaseAppointmentStore::new(&config)),
            ),
        };
    info!(
        backend = %config.storage_backend,
        utc_offset_minutes = config.business_utc_offset_minutes,
        slot_step_minutes = config.slot_step_minutes,
        "Storage configured"
    );

    let clock: SharedClock = Arc::new(SystemClock);
    let catalog_state = CatalogState::new(config.clone(), catalog_store.clone(), clock.clone());
    let appointment_state = AppointmentState::new(
        config.clone(),
        catalog_store,
        appointment_store,
        clock,
        AvailabilityNotifier::default(),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(catalog_state, appointment_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
