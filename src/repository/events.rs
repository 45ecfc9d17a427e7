use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{
    CreateEventRequest, CreateZoneRequest, Event, TicketZone, UpdateEventRequest,
};
use crate::utils::error::AppError;
use crate::utils::slug::slugify;

use super::is_unique_violation;

pub async fn list_published(pool: &PgPool) -> Result<Vec<Event>, AppError> {
    let events = sqlx::query_as::<_, Event>(
        "SELECT * FROM events WHERE published ORDER BY starts_at ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Event, AppError> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Event was not found".to_string()))
}

pub async fn zones_for_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<TicketZone>, AppError> {
    let zones = sqlx::query_as::<_, TicketZone>(
        "SELECT * FROM ticket_zones WHERE event_id = $1 ORDER BY price ASC",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(zones)
}

pub async fn create(pool: &PgPool, req: &CreateEventRequest) -> Result<Event, AppError> {
    let result = sqlx::query_as::<_, Event>(
        "INSERT INTO events (id, organizer, title, slug, description, venue, city,
                             starts_at, ends_at, published, cover_image_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&req.organizer)
    .bind(&req.title)
    .bind(slugify(&req.title))
    .bind(req.description.as_deref())
    .bind(&req.venue)
    .bind(&req.city)
    .bind(req.starts_at)
    .bind(req.ends_at)
    .bind(req.published.unwrap_or(false))
    .bind(req.cover_image_url.as_deref())
    .fetch_one(pool)
    .await;

    match result {
        Ok(event) => Ok(event),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "An event with the same title already exists".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn update(pool: &PgPool, id: Uuid, req: &UpdateEventRequest) -> Result<Event, AppError> {
    sqlx::query_as::<_, Event>(
        "UPDATE events
         SET organizer = COALESCE($2, organizer),
             title = COALESCE($3, title),
             description = COALESCE($4, description),
             venue = COALESCE($5, venue),
             city = COALESCE($6, city),
             starts_at = COALESCE($7, starts_at),
             ends_at = COALESCE($8, ends_at),
             published = COALESCE($9, published),
             cover_image_url = COALESCE($10, cover_image_url),
             updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(req.organizer.as_deref())
    .bind(req.title.as_deref())
    .bind(req.description.as_deref())
    .bind(req.venue.as_deref())
    .bind(req.city.as_deref())
    .bind(req.starts_at)
    .bind(req.ends_at)
    .bind(req.published)
    .bind(req.cover_image_url.as_deref())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Event was not found".to_string()))
}

/// Events with sold tickets are protected by the transaction foreign key;
/// surface that as a conflict rather than a driver error.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            Err(AppError::NotFound("Event was not found".to_string()))
        }
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
            AppError::Conflict("The event has ticket sales and cannot be deleted".to_string()),
        ),
        Err(e) => Err(e.into()),
    }
}

pub async fn create_zone(
    pool: &PgPool,
    event_id: Uuid,
    req: &CreateZoneRequest,
) -> Result<TicketZone, AppError> {
    // ensure the event exists first so the client gets a 404, not an FK error
    get(pool, event_id).await?;

    let now = Utc::now();
    let zone = sqlx::query_as::<_, TicketZone>(
        "INSERT INTO ticket_zones (id, event_id, name, phase, price,
                                   total_quantity, available_quantity, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $7)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(&req.name)
    .bind(&req.phase)
    .bind(req.price)
    .bind(req.total_quantity)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(zone)
}
