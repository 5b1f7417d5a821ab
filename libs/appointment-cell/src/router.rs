use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AppointmentState;

pub fn appointment_routes(state: AppointmentState) -> Router {
    // Customers book without accounts; the phone number identifies them.
    let public_routes = Router::new()
        .route("/availability", get(handlers::get_availability))
        .route("/book", post(handlers::book_appointment))
        .route("/events", get(handlers::availability_events))
        .route("/{appointment_id}/reschedule", post(handlers::reschedule_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment));

    let staff_routes = Router::new()
        .route("/admin", get(handlers::list_appointments))
        .route("/admin/stats", get(handlers::dashboard_stats))
        .route("/admin/{appointment_id}", get(handlers::get_appointment))
        .route("/admin/{appointment_id}/cancel", post(handlers::staff_cancel_appointment))
        .route("/admin/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/admin/{appointment_id}/no-show", post(handlers::mark_no_show))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(staff_routes)
        .with_state(state)
}
