use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::extract::AdminUser;
use crate::models::event::{CreateEventRequest, CreateZoneRequest, EventWithZones, UpdateEventRequest};
use crate::repository;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = repository::events::list_published(&state.pool).await?;

    Ok(success(events, "Events retrieved"))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = repository::events::get(&state.pool, id).await?;
    let zones = repository::events::zones_for_event(&state.pool, id).await?;

    Ok(success(EventWithZones { event, zones }, "Event retrieved"))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    if let Some(ends_at) = req.ends_at {
        if ends_at <= req.starts_at {
            return Err(AppError::ValidationError(
                "The event must end after it starts".to_string(),
            ));
        }
    }

    let event = repository::events::create(&state.pool, &req).await?;

    Ok(created(event, "Event created"))
}

pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Response, AppError> {
    let event = repository::events::update(&state.pool, id, &req).await?;

    Ok(success(event, "Event updated"))
}

pub async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    repository::events::delete(&state.pool, id).await?;

    Ok(empty_success("Event deleted"))
}

pub async fn create_zone(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
    Json(req): Json<CreateZoneRequest>,
) -> Result<Response, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Zone name is required".to_string()));
    }
    if req.price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Price cannot be negative".to_string(),
        ));
    }
    if req.total_quantity <= 0 {
        return Err(AppError::ValidationError(
            "Zone capacity must be positive".to_string(),
        ));
    }

    let zone = repository::events::create_zone(&state.pool, event_id, &req).await?;

    Ok(created(zone, "Ticket zone created"))
}
