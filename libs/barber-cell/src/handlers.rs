use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    CreateBarberRequest, CreateServiceRequest, DayOfWeek, UpdateBarberRequest,
    UpdateServiceRequest, UpsertScheduleRequest,
};
use crate::state::CatalogState;

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_barbers_public(
    State(state): State<CatalogState>,
) -> Result<Json<Value>, AppError> {
    let barbers = state.catalog.list_barbers(true).await?;

    Ok(Json(json!({
        "barbers": barbers,
        "total": barbers.len()
    })))
}

#[axum::debug_handler]
pub async fn get_barber_public(
    State(state): State<CatalogState>,
    Path(barber_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let barber = state.catalog.get_active_barber(barber_id).await?;
    Ok(Json(json!(barber)))
}

#[axum::debug_handler]
pub async fn list_barber_services_public(
    State(state): State<CatalogState>,
    Path(barber_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.catalog.get_active_barber(barber_id).await?;
    let services = state.catalog.list_barber_services(barber_id).await?;

    Ok(Json(json!({
        "barber_id": barber_id,
        "services": services
    })))
}

#[axum::debug_handler]
pub async fn get_barber_schedule_public(
    State(state): State<CatalogState>,
    Path(barber_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.catalog.get_active_barber(barber_id).await?;
    let schedule = state.catalog.list_working_schedule(barber_id).await?;

    Ok(Json(json!({
        "barber_id": barber_id,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn list_services_public(
    State(state): State<CatalogState>,
) -> Result<Json<Value>, AppError> {
    let services = state.catalog.list_services().await?;
    Ok(Json(json!({ "services": services })))
}

// ==============================================================================
// STAFF HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_barbers(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let barbers = state.catalog.list_barbers(false).await?;

    Ok(Json(json!({
        "barbers": barbers,
        "total": barbers.len()
    })))
}

#[axum::debug_handler]
pub async fn create_barber(
    State(state): State<CatalogState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateBarberRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let barber = state.catalog.create_barber(request).await?;
    info!("Barber {} created by {}", barber.id, user.id);
    Ok((StatusCode::CREATED, Json(json!(barber))))
}

#[axum::debug_handler]
pub async fn update_barber(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<UpdateBarberRequest>,
) -> Result<Json<Value>, AppError> {
    let barber = state.catalog.update_barber(barber_id, request).await?;
    Ok(Json(json!(barber)))
}

#[axum::debug_handler]
pub async fn create_barber_service(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
    Path(barber_id): Path<Uuid>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = state.catalog.create_barber_service(barber_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!(service))))
}

#[axum::debug_handler]
pub async fn update_barber_service(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
    Path((barber_id, service_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = state
        .catalog
        .update_barber_service(barber_id, service_id, request)
        .await?;
    Ok(Json(json!(service)))
}

#[axum::debug_handler]
pub async fn delete_barber_service(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
    Path((barber_id, service_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state
        .catalog
        .delete_barber_service(barber_id, service_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn upsert_working_schedule(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
    Path((barber_id, day)): Path<(Uuid, String)>,
    Json(request): Json<UpsertScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let day: DayOfWeek = day.parse()?;
    let schedule = state
        .catalog
        .upsert_working_schedule(barber_id, day, request)
        .await?;
    Ok(Json(json!(schedule)))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = state.catalog.create_service(request).await?;
    Ok((StatusCode::CREATED, Json(json!(service))))
}

#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<CatalogState>,
    Extension(_user): Extension<User>,
    Path(service_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_service(service_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
