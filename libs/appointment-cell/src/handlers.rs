use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::stream::{self, Stream};
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use barber_cell::models::ServiceRef;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::serde_time::format_hhmm;

use crate::models::{
    AppointmentFilter, AvailabilityQuery, BookAppointmentRequest, CancelRequest, RescheduleRequest,
};
use crate::state::AppointmentState;

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<AppointmentState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service_ref = ServiceRef::from_parts(query.service_kind, query.service_id);
    let slots = state
        .slots
        .available_slots(query.barber_id, query.date, service_ref)
        .await?;

    Ok(Json(json!({
        "date": query.date,
        "barber_id": query.barber_id,
        "slots": slots.iter().map(format_hhmm).collect::<Vec<_>>()
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = state.booking.book(request).await?;
    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state.booking.reschedule(appointment_id, request).await?;
    Ok(Json(json!(outcome)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .cancel_by_customer(appointment_id, &request.customer_phone)
        .await?;
    Ok(Json(json!(appointment)))
}

/// Server-sent stream of `availability_changed` events. A `resync` event
/// tells the client it missed events and should refetch.
pub async fn availability_events(
    State(state): State<AppointmentState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Availability stream opened");
    let receiver = state.notifier.subscribe();

    let events = stream::unfold(receiver, |mut receiver| async move {
        let event = match receiver.recv().await {
            Ok(change) => Event::default()
                .event("availability_changed")
                .json_data(change)
                .unwrap_or_else(|_| Event::default().event("resync")),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Availability subscriber lagged by {} events", skipped);
                Event::default().event("resync")
            }
            Err(RecvError::Closed) => return None,
        };
        Some((Ok(event), receiver))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.booking.list(filter).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.get(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn staff_cancel_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.cancel_by_staff(appointment_id).await?;
    info!("Appointment {} cancelled by {}", appointment_id, user.id);
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.complete(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn mark_no_show(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.booking.mark_no_show(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn dashboard_stats(
    State(state): State<AppointmentState>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let stats = state.stats.dashboard().await?;
    Ok(Json(json!(stats)))
}
