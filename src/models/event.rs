use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub venue: String,
    pub city: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One priced section of an event during one sale phase, e.g.
/// "VIP / early bird". Tickets are sold against a zone and draw down its
/// availability.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketZone {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub phase: String,
    pub price: Decimal,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct EventWithZones {
    #[serde(flatten)]
    pub event: Event,
    pub zones: Vec<TicketZone>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub organizer: String,
    pub title: String,
    pub description: Option<String>,
    pub venue: String,
    pub city: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: Option<bool>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub organizer: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: Option<bool>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateZoneRequest {
    pub name: String,
    pub phase: String,
    pub price: Decimal,
    pub total_quantity: i32,
}
