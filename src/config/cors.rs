use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::Settings;

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

pub fn create_cors_layer(settings: &Settings) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(settings))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-user-id"),
            HeaderName::from_static("x-user-email"),
            HeaderName::from_static("x-user-name"),
        ])
        .expose_headers([
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn allowed_origins(settings: &Settings) -> AllowOrigin {
    let origins: Vec<HeaderValue> = settings
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS: No valid origins configured, using permissive settings for development"
        );
        AllowOrigin::any()
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
        AllowOrigin::list(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_origins(origins: &[&str]) -> Settings {
        Settings {
            database_url: String::new(),
            port: 0,
            max_connections: 1,
            cors_allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
            production: false,
            storage_public_base_url: String::new(),
            ticket_download_delay_days: 3,
        }
    }

    #[test]
    fn layer_builds_with_configured_origins() {
        let settings =
            settings_with_origins(&["http://localhost:3000", "https://entrada.example"]);
        let _layer = create_cors_layer(&settings);
    }

    #[test]
    fn invalid_origins_are_skipped() {
        let settings = settings_with_origins(&["http://localhost:3000", "not a header\nvalue"]);
        let _layer = create_cors_layer(&settings);
    }
}
