use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::CatalogState;

pub fn catalog_routes(state: CatalogState) -> Router {
    let public_routes = Router::new()
        .route("/barbers", get(handlers::list_barbers_public))
        .route("/barbers/{barber_id}", get(handlers::get_barber_public))
        .route("/barbers/{barber_id}/services", get(handlers::list_barber_services_public))
        .route("/barbers/{barber_id}/schedule", get(handlers::get_barber_schedule_public))
        .route("/services", get(handlers::list_services_public));

    let staff_routes = Router::new()
        .route(
            "/admin/barbers",
            get(handlers::list_barbers).post(handlers::create_barber),
        )
        .route("/admin/barbers/{barber_id}", put(handlers::update_barber))
        .route(
            "/admin/barbers/{barber_id}/services",
            post(handlers::create_barber_service),
        )
        .route(
            "/admin/barbers/{barber_id}/services/{service_id}",
            put(handlers::update_barber_service).delete(handlers::delete_barber_service),
        )
        .route(
            "/admin/barbers/{barber_id}/schedule/{day}",
            put(handlers::upsert_working_schedule),
        )
        .route("/admin/services", post(handlers::create_service))
        .route(
            "/admin/services/{service_id}",
            delete(handlers::delete_service),
        )
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .with_state(state)
}
