use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DOWNLOAD_DELAY_DAYS: i64 = 3;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Runtime configuration, read once at startup and shared through the
/// application state.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
    /// `RUST_ENV=production` turns on HSTS.
    pub production: bool,
    /// Prefix every stored blob URL (payment proofs, ticket PDFs, images)
    /// must carry. URLs outside the bucket are rejected.
    pub storage_public_base_url: String,
    /// Days between approving a full-payment purchase and its tickets
    /// becoming downloadable.
    pub ticket_download_delay_days: i64,
}

impl Settings {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/entrada".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        let storage_public_base_url = env::var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "https://storage.entrada.example/".to_string());

        let ticket_download_delay_days = env::var("TICKET_DOWNLOAD_DELAY_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DOWNLOAD_DELAY_DAYS);

        Self {
            database_url,
            port,
            max_connections,
            cors_allowed_origins,
            production,
            storage_public_base_url,
            ticket_download_delay_days,
        }
    }

    /// Whether `url` points inside the configured storage bucket.
    pub fn is_storage_url(&self, url: &str) -> bool {
        url.starts_with(&self.storage_public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            database_url: "postgres://localhost/entrada_test".into(),
            port: 0,
            max_connections: 1,
            cors_allowed_origins: vec![],
            production: false,
            storage_public_base_url: "https://storage.entrada.example/".into(),
            ticket_download_delay_days: 3,
        }
    }

    #[test]
    fn storage_url_check_is_prefix_based() {
        let settings = test_settings();
        assert!(settings.is_storage_url("https://storage.entrada.example/proofs/a.png"));
        assert!(!settings.is_storage_url("https://evil.example/proofs/a.png"));
    }
}
