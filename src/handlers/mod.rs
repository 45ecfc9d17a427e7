use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod blog;
pub mod contact;
pub mod events;
pub mod installments;
pub mod products;
pub mod transactions;
pub mod users;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "entrada-api",
    };

    success(payload, "Health check successful")
}
