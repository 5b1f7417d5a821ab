use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::state::AppointmentState;
use barber_cell::router::catalog_routes;
use barber_cell::state::CatalogState;

pub fn create_router(catalog: CatalogState, appointments: AppointmentState) -> Router {
    Router::new()
        .route("/", get(|| async { "Barbershop API is running!" }))
        .merge(catalog_routes(catalog))
        .nest("/appointments", appointment_routes(appointments))
}
