use std::sync::Arc;

use sqlx::PgPool;

pub mod config;
pub mod domain;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod utils;

use config::Settings;

/// Shared application state: the connection pool and the startup settings.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub settings: Arc<Settings>,
}
